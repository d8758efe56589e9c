pub mod account;
pub mod git;
pub mod quota;
pub mod quota_fetch;
pub mod transcript;

pub use account::{AccountCollector, AccountInfo, HomeAccountCollector, StubAccountCollector};
pub use git::{GitCollector, GitInfo, LocalGitCollector, StubGitCollector};
pub use quota::{CachedApiQuotaCollector, QuotaCollector, QuotaInfo, StubQuotaCollector};
pub use transcript::{
    ActivityInfo, FileTranscriptCollector, StubTranscriptCollector, TranscriptCollector,
};
