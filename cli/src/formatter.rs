use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, Row, Table};
use equate::{Confidence, EquivalenceVerdict, GradingResult, Mastery};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn format_verdict(
        &self,
        student: &str,
        expected: &str,
        verdict: &EquivalenceVerdict,
    ) -> String {
        let mut table = self.answers_table(Some(student), Some(expected));

        let equivalent = if verdict.is_equivalent { "yes" } else { "no" };
        table.add_row(Row::from(vec![
            Cell::new("Equivalent"),
            Cell::new(equivalent).fg(if verdict.is_equivalent {
                Color::Green
            } else {
                Color::Red
            }),
        ]));
        table.add_row(Row::from(vec![
            Cell::new("Confidence"),
            Cell::new(verdict.confidence.to_string()).fg(confidence_color(verdict.confidence)),
        ]));
        table.add_row(Row::from(vec![Cell::new("Reason"), Cell::new(&verdict.reason)]));

        format!("{}\n", table)
    }

    pub fn format_grade(
        &self,
        student: Option<&str>,
        expected: Option<&str>,
        result: &GradingResult,
    ) -> String {
        let mut table = self.answers_table(student, expected);

        table.add_row(Row::from(vec![
            Cell::new("Score"),
            Cell::new(format!("{:.2}", result.score)).set_alignment(CellAlignment::Right),
        ]));
        table.add_row(Row::from(vec![
            Cell::new("Mastery"),
            Cell::new(result.mastery.to_string()).fg(mastery_color(result.mastery)),
        ]));
        table.add_row(Row::from(vec![Cell::new("Reason"), Cell::new(&result.reason)]));

        format!("{}\n", table)
    }

    fn answers_table(&self, student: Option<&str>, expected: Option<&str>) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Field").set_alignment(CellAlignment::Left),
            Cell::new("Value").set_alignment(CellAlignment::Left),
        ]));

        table.add_row(Row::from(vec!["Student", student.unwrap_or("-")]));
        table.add_row(Row::from(vec!["Expected", expected.unwrap_or("-")]));
        table
    }
}

fn confidence_color(confidence: Confidence) -> Color {
    match confidence {
        Confidence::High => Color::Green,
        Confidence::Medium => Color::Yellow,
        Confidence::Low => Color::Red,
    }
}

fn mastery_color(mastery: Mastery) -> Color {
    match mastery {
        Mastery::High => Color::Green,
        Mastery::Medium => Color::Yellow,
        Mastery::Low => Color::Red,
    }
}
