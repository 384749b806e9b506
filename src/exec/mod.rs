pub mod executor;
pub mod parser;

pub use executor::{ExecutionResult, Failure, Invocation, ToolExecutor, ToolPrograms};
pub use parser::{parse_commit_hash, parse_created_url, OutputParser, ParsedOutput};
