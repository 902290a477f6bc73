// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_paragraphs(count: usize) -> String {
    let base = "<p>Paragraph with <b>some</b> content and a <i>trailing</i> space </p>";
    base.repeat(count)
}

/// A list of paragraphs wrapped in `depth` nested inline elements.
#[allow(dead_code)]
pub fn generate_nested_markup(paragraphs: usize, depth: usize) -> String {
    let mut content = String::new();
    for i in 0..paragraphs {
        content.push_str("<p>");
        for _ in 0..depth {
            content.push_str("<span>");
        }
        content.push_str(&format!("line {i} with text"));
        for _ in 0..depth {
            content.push_str("</span>");
        }
        content.push_str("<br></p>");
    }
    content
}

#[allow(dead_code)]
pub fn generate_table(rows: usize, cols: usize) -> String {
    let mut content = String::from("<table><tbody>");
    for row in 0..rows {
        content.push_str("<tr>");
        for col in 0..cols {
            content.push_str(&format!("<td>cell {row}.{col}</td>"));
        }
        content.push_str("</tr>");
    }
    content.push_str("</tbody></table>");
    content
}
