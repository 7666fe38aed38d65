pub mod attributes;
pub mod errors;
pub mod prompts;
pub mod utils;

pub const TABLE_NAME_DEFAULT: &str = "genai-cctv-table";
pub const PROMPT_TABLE_NAME_DEFAULT: &str = "genai-cctv-prompt-table";
pub const UTIL_TABLE_NAME_DEFAULT: &str = "genai-cctv-util-table";

/// Partition key shared by every table of the stack.
pub const KEY_ATTRIBUTE: &str = "ID";
