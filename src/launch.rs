//! Debuggee source materialization.
//!
//! Before launch, the session assembles the text the runtime will
//! actually execute: a one-line pause preamble, the user's source, and
//! optionally a synthetic call to the program's entry function. The
//! preamble forces a deterministic first pause so breakpoints can be
//! armed before any user code runs.

use std::io;
use std::path::PathBuf;

use tempfile::TempDir;

/// Number of lines the injected preamble occupies at the top of the
/// materialized script.
///
/// Every line translation between the client (1-based, preamble-free)
/// and the inspector (0-based, preamble included) is computed from this
/// constant; nothing relies on the two offsets happening to cancel.
pub const INJECTED_PREAMBLE_LINES: i64 = 1;

/// The preamble itself. Must span exactly [`INJECTED_PREAMBLE_LINES`] lines.
const PREAMBLE: &str = "debugger;\n";

/// Prefix marking the console line that carries the entry function's
/// return value.
pub const RESULT_SENTINEL: &str = "__GANTRY_RESULT__:";

/// Map a client breakpoint line (1-based) to the inspector line
/// (0-based, in the materialized script) to arm it at.
pub fn breakpoint_line_for(user_line: i64) -> i64 {
    user_line - 1 + INJECTED_PREAMBLE_LINES
}

/// Map an inspector line (0-based, in the materialized script) back to
/// the client line (1-based) to report.
pub fn user_line_for(inspector_line: i64) -> i64 {
    inspector_line + 1 - INJECTED_PREAMBLE_LINES
}

/// Whether an inspector line falls inside the injected preamble.
pub fn is_preamble_line(inspector_line: i64) -> bool {
    (0..INJECTED_PREAMBLE_LINES).contains(&inspector_line)
}

/// Assemble the text the runtime executes.
///
/// `call_main` supplies the arguments for a synthetic invocation of the
/// program's `main` entry function; its values are appended positionally
/// in map order. The invocation prints the sentinel-prefixed result line
/// the session captures, then yields briefly so the inspector delivers
/// that final console message before the process exits.
pub fn assemble_source(
    source: &str,
    call_main: Option<&serde_json::Map<String, serde_json::Value>>,
) -> String {
    let mut text = String::with_capacity(PREAMBLE.len() + source.len() + 256);
    text.push_str(PREAMBLE);
    text.push_str(source);
    if !source.ends_with('\n') {
        text.push('\n');
    }

    if let Some(args) = call_main {
        let rendered: Vec<String> = args.values().map(|v| v.to_string()).collect();
        text.push('\n');
        text.push_str(&format!(
            "globalThis.__gantry_result__ = await main({});\n",
            rendered.join(", ")
        ));
        text.push_str(&format!(
            "console.log({:?} + JSON.stringify(globalThis.__gantry_result__));\n",
            RESULT_SENTINEL
        ));
        text.push_str("await new Promise((resolve) => setTimeout(resolve, 50));\n");
    }

    text
}

/// A materialized debuggee program on disk.
///
/// Dropping the value removes the temporary directory and the script
/// inside it.
#[derive(Debug)]
pub struct MaterializedProgram {
    _dir: TempDir,
    /// Path of the script the runtime executes.
    pub path: PathBuf,
}

/// Write the assembled source into a fresh temporary directory.
pub fn materialize(
    source: &str,
    call_main: Option<&serde_json::Map<String, serde_json::Value>>,
) -> io::Result<MaterializedProgram> {
    let dir = tempfile::Builder::new().prefix("gantry-debug-").tempdir()?;
    let path = dir.path().join("script.ts");
    std::fs::write(&path, assemble_source(source, call_main))?;
    Ok(MaterializedProgram { _dir: dir, path })
}
