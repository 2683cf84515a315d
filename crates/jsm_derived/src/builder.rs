/// Line-oriented Java source text with indentation handling.
#[derive(Debug, Default, Clone)]
pub struct SourceBuilder {
    content: String,
    indent_level: usize,
    indent: String,
}

impl SourceBuilder {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            indent_level: 0,
            indent: indent.into(),
        }
    }

    pub fn line(&mut self, line: &str) {
        if line.is_empty() {
            self.content.push('\n');
            return;
        }
        for _ in 0..self.indent_level {
            self.content.push_str(&self.indent);
        }
        self.content.push_str(line);
        self.content.push('\n');
    }

    pub fn blank(&mut self) {
        if !self.content.is_empty() && !self.content.ends_with("\n\n") && !self.content.ends_with("{\n") {
            self.content.push('\n');
        }
    }

    /// Open a block: the line followed by ` {`.
    pub fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.indent_level += 1;
    }

    pub fn close(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.line("}");
    }

    /// A method with a single-statement body.
    pub fn method(&mut self, annotations: &[&str], header: &str, statement: &str) {
        for annotation in annotations {
            self.line(annotation);
        }
        self.open(header);
        self.line(statement);
        self.close();
    }

    pub fn build(self) -> String {
        self.content
    }
}
