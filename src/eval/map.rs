use super::command::split_output;
use super::{Interpreter, RunReport};
use crate::ast::{Binding, MapInstruction, Quote};

const LINE_TOKEN: &str = "{line}";

/// Cartesian product over columns of lines, first column outermost.
///
/// No columns yields one empty tuple; any empty column yields nothing.
pub(crate) struct Product<'a> {
    columns: &'a [Vec<String>],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Product<'a> {
    pub(crate) fn new(columns: &'a [Vec<String>]) -> Self {
        Product {
            columns,
            indices: vec![0; columns.len()],
            done: columns.iter().any(Vec::is_empty),
        }
    }
}

impl<'a> Iterator for Product<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let columns = self.columns;
        let tuple = self
            .indices
            .iter()
            .zip(columns)
            .map(|(&i, column)| column[i].as_str())
            .collect();

        // Odometer step, last column fastest
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < columns[pos].len() {
                break;
            }
            self.indices[pos] = 0;
        }

        Some(tuple)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Fill `$variable` and `{line}` in a double-quoted body.
///
/// `$name` takes the longest identifier after the `$`; names that are not
/// bound are left for the shell. `{line}` takes the first value.
/// Inserted values are not scanned again.
pub(crate) fn interpolate(template: &str, inputs: &[Binding], values: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(|c: char| c == '$' || c == '{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let (Some(after), Some(first)) = (tail.strip_prefix(LINE_TOKEN), values.first()) {
            out.push_str(first);
            rest = after;
            continue;
        }

        if let Some(after) = tail.strip_prefix('$') {
            let len = after.find(|c: char| !is_ident_char(c)).unwrap_or(after.len());
            let name = &after[..len];
            if let Some(slot) = inputs.iter().position(|b| !name.is_empty() && b.variable == name) {
                out.push_str(values[slot]);
                rest = &after[len..];
                continue;
            }
        }

        // '$' and '{' are one byte each
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

impl Interpreter {
    /// `map $a $b ... do <body> [clauses]`
    pub(crate) fn eval_map(&mut self, line: usize, map: &MapInstruction, report: &mut RunReport) {
        // Snapshot inputs so the body sees the streams as they were when the map started
        let columns: Vec<Vec<String>> = map
            .inputs
            .iter()
            .map(|b| self.streams.lines(&b.stream).to_vec())
            .collect();

        let mut collected = Vec::new();
        for values in Product::new(&columns) {
            let command = match map.command.quote {
                Quote::Double => interpolate(&map.command.text, &map.inputs, &values),
                Quote::Single => map.command.text.clone(),
            };
            if let Some(output) = self.execute_command(line, &command, report) {
                collected.extend(split_output(&output));
            }
        }

        let lines = match &map.clauses.parser {
            Some(parser) => match self.apply_parser(line, parser, &collected.join("\n"), report) {
                Some(lines) => lines,
                None => return,
            },
            None => collected,
        };

        self.deliver(line, &map.clauses, lines, report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(cols: &[&[&str]]) -> Vec<Vec<String>> {
        cols.iter()
            .map(|c| c.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn product_outer_loop_is_first_column() {
        let cols = columns(&[&["a", "b"], &["1", "2"]]);
        let tuples: Vec<Vec<&str>> = Product::new(&cols).collect();
        assert_eq!(
            tuples,
            vec![vec!["a", "1"], vec!["a", "2"], vec!["b", "1"], vec!["b", "2"]]
        );
    }

    #[test]
    fn product_of_three_columns() {
        let cols = columns(&[&["x"], &["1", "2"], &["p", "q"]]);
        assert_eq!(Product::new(&cols).count(), 4);
        assert_eq!(Product::new(&cols).last(), Some(vec!["x", "2", "q"]));
    }

    #[test]
    fn empty_column_gives_empty_product() {
        let cols = columns(&[&["a", "b"], &[]]);
        assert_eq!(Product::new(&cols).count(), 0);
    }

    #[test]
    fn no_columns_gives_one_empty_tuple() {
        let cols: Vec<Vec<String>> = Vec::new();
        let tuples: Vec<Vec<&str>> = Product::new(&cols).collect();
        assert_eq!(tuples, vec![Vec::<&str>::new()]);
    }

    #[test]
    fn interpolate_variables_and_line() {
        let inputs = vec![Binding::named("host"), Binding::named("port")];
        assert_eq!(
            interpolate("nc -z $host $port # {line}", &inputs, &["db", "5432"]),
            "nc -z db 5432 # db"
        );
    }

    #[test]
    fn interpolate_prefers_longest_name() {
        let inputs = vec![Binding::named("a"), Binding::named("ab")];
        assert_eq!(interpolate("$ab-$a", &inputs, &["1", "2"]), "2-1");
    }

    #[test]
    fn interpolate_leaves_unbound_and_shell_syntax() {
        let inputs = vec![Binding::named("x")];
        assert_eq!(
            interpolate("echo $HOME ${x} $ {x} $x$", &inputs, &["v"]),
            "echo $HOME ${x} $ {x} v$"
        );
    }

    #[test]
    fn interpolated_values_are_not_rescanned() {
        let inputs = vec![Binding::named("x"), Binding::named("y")];
        assert_eq!(interpolate("$x", &inputs, &["$y", "no"]), "$y");
    }

    #[test]
    fn interpolate_uses_binding_variable_not_stream() {
        let inputs = vec![Binding {
            variable: "host".into(),
            stream: "_input_hosts.txt".into(),
        }];
        assert_eq!(interpolate("ping $host", &inputs, &["a"]), "ping a");
    }

    #[test]
    fn line_token_without_inputs_is_literal() {
        assert_eq!(interpolate("echo {line}", &[], &[]), "echo {line}");
    }
}
