//! A diagram paired with its snapshot writer.
//!
//! Hosts apply commands through the session; every successful command hands
//! a fresh model snapshot to the writer, which debounces the actual write.
//! Failed commands change nothing and submit nothing.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::error;

use crate::command::{Applied, Command};
use crate::diagram::{Diagram, Warning};
use crate::error::{ErrorCode, ModelError};
use crate::persistence::{PersistError, PersistHandle};

pub struct DiagramSession {
    diagram: Diagram,
    persister: PersistHandle,
}

impl DiagramSession {
    #[must_use]
    pub fn new(diagram: Diagram, persister: PersistHandle) -> Self {
        Self { diagram, persister }
    }

    #[must_use]
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.diagram.warnings()
    }

    /// Apply `command` and queue a snapshot of the result.
    ///
    /// # Errors
    ///
    /// Returns the command's [`ModelError`]; the diagram is unchanged and no
    /// snapshot is queued.
    pub fn apply(&mut self, command: Command) -> Result<Applied, ModelError> {
        let applied = self.diagram.apply(command)?;
        match self.diagram.to_model() {
            Ok(snapshot) => self.persister.submit(snapshot),
            Err(e) => error!(error = %e, code = e.error_code(), "snapshot export failed; change not queued"),
        }
        Ok(applied)
    }

    /// Write the latest snapshot now.
    ///
    /// # Errors
    ///
    /// Returns the writer's [`PersistError`].
    pub async fn flush(&self) -> Result<(), PersistError> {
        self.persister.flush().await
    }

    /// Write the latest snapshot, stop the writer and hand back the diagram.
    ///
    /// # Errors
    ///
    /// Returns the final write's [`PersistError`].
    pub async fn close(self) -> Result<Diagram, PersistError> {
        self.persister.shutdown().await?;
        Ok(self.diagram)
    }
}
