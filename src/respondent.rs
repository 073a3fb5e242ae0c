//! Respondent channel: the capability of putting a question in front of a
//! human (or simulated) respondent and getting an answer back.
//!
//! The engine only depends on this trait: any transport that can suspend
//! until an answer exists satisfies the contract, whether that is console
//! input, a request/reply socket, or a UI callback. Concrete transports live
//! outside the crate; the test suite ships a scripted implementation.

use async_trait::async_trait;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use crate::question::Question;

/// Present questions to a respondent and obtain their answers.
///
/// `present` suspends until an answer is available. The core imposes no
/// timeout; a transport that enforces one reports it as
/// [`ChannelError::Timeout`], which terminates the session like any other
/// failure without corrupting already-recorded answers.
///
/// Implementations must be safe to share behind an `Arc` across sessions.
#[async_trait]
pub trait RespondentChannel: Send + Sync {
    /// Show the question and wait for the raw answer string.
    async fn present(&self, question: &Question) -> Result<String, ChannelError>;
}

/// Failures of the respondent transport.
#[derive(Debug, Error, Diagnostic)]
pub enum ChannelError {
    /// The transport can no longer deliver questions or receive answers.
    #[error("respondent channel closed")]
    #[diagnostic(
        code(colloquy::respondent::closed),
        help("The respondent disconnected or the transport shut down mid-session.")
    )]
    Closed,

    /// A transport-enforced wait limit elapsed before an answer arrived.
    #[error("no answer after {waited:?}")]
    #[diagnostic(code(colloquy::respondent::timeout))]
    Timeout { waited: Duration },

    /// Any other transport-level failure.
    #[error("respondent transport failed: {message}")]
    #[diagnostic(code(colloquy::respondent::transport))]
    Transport { message: String },
}

impl ChannelError {
    pub fn transport(message: impl Into<String>) -> Self {
        ChannelError::Transport {
            message: message.into(),
        }
    }
}
