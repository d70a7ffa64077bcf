// Git module providing the local working copy operations

mod commit;
mod credentials;
mod repository;
mod working_copy;

// Re-export primary types for public use
pub use commit::CommitResult;
pub use credentials::Credentials;
pub use repository::GitRepo;
pub use working_copy::{GitWorkingCopy, WorkingCopy};
