//! Trace statement generation
//!
//! The generated line is Java source for the weaver to compile. Its output
//! format is parsed by downstream log tooling, so it must not drift:
//!
//! ```text
//! LogLifeCycle: com.example.Screen1 [12345678] ⟳ onCreate
//! ```

/// Log tag of every injected statement
pub const LOG_TAG: &str = "LogLifeCycle";

/// Lifecycle marker glyph (U+27F3 CLOCKWISE GAPPED CIRCLE ARROW)
pub const LIFECYCLE_GLYPH: char = '\u{27F3}';

/// Logging call the statement is built around
const LOG_CALL: &str = "android.util.Log.d";

/// Per-instance identity of the receiver, evaluated at runtime
const INSTANCE_IDENTITY: &str = "System.identityHashCode(this)";

/// Build the trace statement for one overridden method
///
/// # Example
/// ```
/// use loglifecycle::statement::generate;
///
/// let stmt = generate("com.example.Screen1", "onCreate");
/// assert_eq!(
///     stmt,
///     "android.util.Log.d(\"LogLifeCycle\", \"com.example.Screen1 [\" \
///      + System.identityHashCode(this) + \"] \u{27F3} onCreate\");"
/// );
/// ```
pub fn generate(class_name: &str, method_name: &str) -> String {
    format!(
        "{LOG_CALL}(\"{LOG_TAG}\", \"{} [\" + {INSTANCE_IDENTITY} + \"] {LIFECYCLE_GLYPH} {}\");",
        escape_java(class_name),
        escape_java(method_name),
    )
}

/// Escape characters that would terminate a Java string literal
fn escape_java(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}
