//! Fixed instruction templates wrapped around the source text.
//!
//! The source is inserted verbatim between triple back-ticks. Nothing is truncated
//! or escaped, so very large files reach the model unchanged.

use tracing::debug;

use crate::contract::{Prompt, SourceText, Task};

const THINK_SUPPRESSION: &str = "Do NOT include any intermediate reasoning or <think> blocks.";

/// Build the prompt for `task` around `source`.
pub fn build_prompt(source: &SourceText, task: Task) -> Prompt {
    let text = match task {
        Task::Complexity => complexity_prompt(&source.content),
        Task::Documentation => documentation_prompt(&source.content, false),
        Task::DocumentationMarkdown => documentation_prompt(&source.content, true),
    };
    debug!(
        task = %task,
        source_bytes = source.content.len(),
        prompt_bytes = text.len(),
        "Built prompt"
    );
    Prompt { task, text }
}

fn complexity_prompt(code: &str) -> String {
    format!(
        "Analyse the time complexity and space complexity of the following code and provide only the final concise answer:\n\
         ```{code}```\n\
         Provide a concise answer like:\n\
         - Time Complexity: O(...)\n\
         - Space Complexity: O(...)\n\
         - Explanation: (short explanation, max 2-3 sentences)\n\
         Strictly follow the above format: time complexity in one line, space complexity in the next line, \
         and start the explanation in the line after that. The explanation may span 2-3 lines of reasoning, \
         but do not give any reasoning after Time Complexity: or Space Complexity:\n\
         {THINK_SUPPRESSION}\n"
    )
}

fn documentation_prompt(code: &str, markdown: bool) -> String {
    let format_rule = if markdown {
        "Format the whole answer as Markdown: use a top-level heading for the file, \
         second-level headings for each section and fenced code blocks for signatures.\n"
    } else {
        ""
    };
    format!(
        "Generate the documentation for the following code:\n\
         ```{code}```\n\
         Provide a clear and concise documentation including:\n\
         - A brief description of what the code does.\n\
         - For each function, the inputs, the outputs and briefly what it does in plain English.\n\
         - Any important notes or assumptions.\n\
         - Dependencies between functions.\n\
         - Dependencies with other files.\n\
         {format_rule}\
         {THINK_SUPPRESSION}\n"
    )
}
