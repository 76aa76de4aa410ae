use crate::error::{Result, ScrapeError};
use rarepairs::{table, DataFiles, RelationshipRecord};
use std::{path::PathBuf, thread, time::Duration};
use tracing::{info, warn};

/// Anything that can count the works for a pairing. The real one is the
/// [`SearchClient`](crate::SearchClient).
pub trait WorkCounter {
    fn work_count(&mut self, name1: &str, name2: &str) -> Result<u64>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
    /// Stopped early by rate limiting, or by an error
    Aborted,
}

/// Reported after every pair that was counted
#[derive(Debug)]
pub struct Progress<'a> {
    /// 1-based
    pub index: usize,
    pub total: usize,
    pub record: &'a RelationshipRecord,
}

/// How a run ended and what it saved
#[derive(Debug)]
pub struct CollectionReport {
    pub state: RunState,
    pub total: usize,
    /// Counted records in enumeration order. Fewer than `total` if aborted.
    pub records: Vec<RelationshipRecord>,
    pub written_to: PathBuf,
}

/// Counts works for every pair in turn, with a fixed pause between requests.
pub struct Collector<C> {
    counter: C,
    /// Pause before every request but the first
    pacing: Duration,
    state: RunState,
}

impl<C: WorkCounter> Collector<C> {
    pub fn new(counter: C) -> Collector<C> {
        Collector {
            counter,
            pacing: Duration::from_secs(5),
            state: RunState::NotStarted,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Collector<C> {
        self.pacing = pacing;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn into_inner(self) -> C {
        self.counter
    }

    /// Counts every pair and writes the table.
    ///
    /// A finished run writes `files.relationships`. Rate limiting ends the run early and writes
    /// what was collected to the partial file instead, still returning `Ok`. Any other error from
    /// the counter is returned as is, and nothing is written. If the finished table cannot be
    /// written, the counts go to the partial file before the write error is returned.
    pub fn run<F>(
        &mut self,
        pairs: Vec<RelationshipRecord>,
        files: &DataFiles,
        mut on_progress: F,
    ) -> Result<CollectionReport>
    where
        F: FnMut(Progress<'_>),
    {
        let total = pairs.len();
        let mut records = Vec::with_capacity(total);

        self.state = RunState::Running;
        info!(total, pacing_secs = self.pacing.as_secs_f64(), "collecting work counts");

        for (i, pair) in pairs.into_iter().enumerate() {
            if i > 0 {
                thread::sleep(self.pacing);
            }

            let count = match self.counter.work_count(&pair.a, &pair.b) {
                Ok(count) => count,
                Err(ScrapeError::RateLimited { attempts }) => {
                    self.state = RunState::Aborted;
                    warn!(
                        attempts,
                        done = records.len(),
                        total,
                        "rate limited, saving partial results"
                    );

                    let written_to = files.partial_relationships();
                    table::write_relationships(&records, &written_to)?;

                    return Ok(CollectionReport {
                        state: self.state,
                        total,
                        records,
                        written_to,
                    });
                }
                Err(e) => {
                    self.state = RunState::Aborted;
                    return Err(e);
                }
            };

            let record = pair.with_count(count);
            on_progress(Progress {
                index: i + 1,
                total,
                record: &record,
            });
            records.push(record);
        }

        let written_to = files.relationships.clone();
        if let Err(e) = table::write_relationships(&records, &written_to) {
            self.state = RunState::Aborted;
            let partial = files.partial_relationships();
            match table::write_relationships(&records, &partial) {
                Ok(()) => warn!(
                    error = %e,
                    path = %partial.display(),
                    "could not write table, saved counts to the partial file"
                ),
                Err(partial_error) => {
                    warn!(error = %partial_error, "could not write the partial file either")
                }
            }
            return Err(e.into());
        }

        self.state = RunState::Completed;
        info!(path = %written_to.display(), "collection complete");

        Ok(CollectionReport {
            state: self.state,
            total,
            records,
            written_to,
        })
    }
}
