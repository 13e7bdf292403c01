// Terminal rendering of upload progress and streamed answers

use std::io::Write;

use folio_stream::{ProgressSnapshot, StreamState};
use folio_upload::UploadProgress;

const BAR_WIDTH: usize = 30;

pub fn progress_line(progress: &UploadProgress) -> String {
    let percent = progress.percent_complete.min(100);
    let filled = BAR_WIDTH * percent as usize / 100;
    format!(
        "[{}{}] {:>3}%  batch {}/{}  ({}/{} files)",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent,
        progress.current_batch,
        progress.total_batches,
        progress.processed_files,
        progress.total_files,
    )
}

/// Writes each snapshot incrementally: step changes to `status`, answer text
/// to `out` as it grows.
pub struct AnswerRenderer<O, S> {
    out: O,
    status: S,
    printed: usize,
    last_status: Option<(u32, String)>,
    last_stats: Option<String>,
}

impl<O: Write, S: Write> AnswerRenderer<O, S> {
    pub fn new(out: O, status: S) -> Self {
        Self {
            out,
            status,
            printed: 0,
            last_status: None,
            last_stats: None,
        }
    }

    pub fn render(&mut self, snapshot: &ProgressSnapshot) -> std::io::Result<()> {
        if let Some(progress) = &snapshot.progress {
            let key = (progress.step, progress.status.clone());
            if self.last_status.as_ref() != Some(&key) {
                writeln!(
                    self.status,
                    "[{}/{}] {}",
                    progress.step, progress.total, progress.status
                )?;
                self.last_status = Some(key);
                self.last_stats = None;
            }

            let stats = progress.stats_line();
            if stats.is_some() && stats != self.last_stats {
                if let Some(line) = &stats {
                    writeln!(self.status, "      done: {}", line)?;
                }
                self.last_stats = stats;
            }
        }

        // A failed exchange replaces its content; the caller reports it
        if snapshot.state != StreamState::Failed {
            if let Some(delta) = snapshot.content.get(self.printed..) {
                if !delta.is_empty() {
                    self.out.write_all(delta.as_bytes())?;
                    self.out.flush()?;
                    self.printed = snapshot.content.len();
                }
            }
        }

        Ok(())
    }

    /// Summary printed after the answer
    pub fn finish(
        &mut self,
        snapshot: &ProgressSnapshot,
        session_total: f64,
    ) -> std::io::Result<()> {
        if self.printed > 0 {
            writeln!(self.out)?;
        }
        if snapshot.state == StreamState::Failed {
            writeln!(self.out, "{}", snapshot.content)?;
            return Ok(());
        }

        let meta = &snapshot.metadata;
        if !meta.selected_documents.is_empty() {
            let names: Vec<&str> = meta
                .selected_documents
                .iter()
                .map(|d| d.filename.as_str())
                .collect();
            writeln!(self.status, "Sources: {}", names.join(", "))?;
        }
        if meta.relevant_pages_count > 0 {
            writeln!(self.status, "Relevant pages: {}", meta.relevant_pages_count)?;
        }
        if let Some(total) = meta.timing.as_ref().and_then(|t| t.total_time) {
            writeln!(self.status, "Time: {:.2}s", total)?;
        }
        if let Some(cost) = meta.costs.as_ref().and_then(|c| c.total_cost) {
            writeln!(self.status, "Cost: ${:.4}", cost)?;
        }
        if let Some(model) = &meta.model {
            writeln!(self.status, "Model: {}", model)?;
        }
        writeln!(self.status, "Session cost: ${:.4}", session_total)?;
        Ok(())
    }
}
