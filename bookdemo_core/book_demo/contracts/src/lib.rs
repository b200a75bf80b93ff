use std::future::Future;

use bookdemo_models::book_demo::DemoRequestSubmission;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait BookDemoFeatureService: Send + Sync + 'static {
    /// Notify the sales team about a demo request.
    ///
    /// Submissions with a filled honeypot are dropped silently and reported as
    /// [`DemoRequestOutcome::Suppressed`].
    fn submit(
        &self,
        submission: DemoRequestSubmission,
    ) -> impl Future<Output = Result<DemoRequestOutcome, BookDemoSubmitError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoRequestOutcome {
    /// The notification email has been accepted by the SMTP server.
    Delivered,
    /// The submission has been identified as spam and was not dispatched.
    Suppressed,
}

#[derive(Debug, Error)]
pub enum BookDemoSubmitError {
    #[error("Failed to send demo request notification.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockBookDemoFeatureService {
    pub fn with_submit(
        mut self,
        submission: DemoRequestSubmission,
        result: Result<DemoRequestOutcome, BookDemoSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
