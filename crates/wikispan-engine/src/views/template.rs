//! Templates, parser functions, parameters and their arguments.

use std::ops::Range;

use wikispan_syntax::brackets::{self, Invocation};
use wikispan_syntax::{ConstructKind, Purpose};

use super::{nested_brackets, own_shadow, typed_view};
use crate::discovery::{self, ScopedScan};
use crate::{EditError, WikiText};

typed_view!(
    /// `{{name|arg|...}}`.
    Template,
    ConstructKind::Template,
    standalone
);

typed_view!(
    /// `{{#name:arg|...}}` or a magic word followed by `:`.
    ParserFunction,
    ConstructKind::ParserFunction,
    standalone
);

typed_view!(
    /// `{{{name|default}}}`.
    Parameter,
    ConstructKind::Parameter,
    standalone
);

typed_view!(
    /// One argument of a template, parser function or parameter, including
    /// its leading separator.
    Argument,
    ConstructKind::Argument,
    standalone
);

/// Split an invocation view into its name and argument ranges (own offsets).
fn invocation(view: &WikiText) -> Option<(String, Invocation)> {
    let kind = view.kind().filter(|k| k.is_invocation())?;
    let (text, shadow, _) = own_shadow(view, Purpose::Parts);
    Some((text, brackets::split_invocation(&shadow, kind)))
}

fn name_of(view: &WikiText) -> String {
    invocation(view)
        .map(|(text, inv)| text[inv.name].to_owned())
        .unwrap_or_default()
}

fn set_name_of(view: &WikiText, name: &str) -> Result<(), EditError> {
    match invocation(view) {
        Some((_, inv)) => view.splice_local(inv.name, name),
        None => Err(EditError::Detached),
    }
}

/// The argument views of an invocation, registering them as needed.
pub(crate) fn arguments_of(owner: &WikiText) -> Vec<Argument> {
    let Some(span) = owner.span() else {
        return Vec::new();
    };
    let Some(kind) = owner.kind().filter(|k| k.is_invocation()) else {
        return Vec::new();
    };
    let (text, shadow, layers) = own_shadow(owner, Purpose::Parts);
    let found: Vec<Range<usize>> = brackets::split_invocation(&shadow, kind)
        .arguments
        .into_iter()
        .map(|r| span.start + r.start..span.start + r.end)
        .collect();
    let foreign = nested_brackets(&layers, text.len(), span.start);
    let ids = discovery::reconcile_scoped(
        &mut owner.document().borrow_mut(),
        &ScopedScan {
            kind: ConstructKind::Argument,
            region: span,
            found: &found,
            valid: &[],
            foreign: &foreign,
        },
    );
    ids.into_iter()
        .map(|id| Argument::from_view(owner.sibling(id)))
        .collect()
}

/// Arguments with their effective names: the trimmed name of a named
/// argument, or the 1-based position among positional ones.
fn named_arguments(owner: &WikiText) -> Vec<(String, Argument)> {
    let mut position = 0;
    arguments_of(owner)
        .into_iter()
        .map(|arg| {
            let name = match arg.explicit_name() {
                Some(name) => name.trim().to_owned(),
                None => {
                    position += 1;
                    position.to_string()
                }
            };
            (name, arg)
        })
        .collect()
}

/// Where a new argument goes: just before the closing braces.
fn append_point(view: &WikiText, braces: usize) -> usize {
    let text = view.text();
    let closing = "}".repeat(braces);
    if text.len() >= 2 * braces && text.ends_with(&closing) {
        text.len() - braces
    } else {
        text.len()
    }
}

impl Template {
    /// The name as written, including surrounding whitespace.
    pub fn name(&self) -> String {
        name_of(self)
    }

    pub fn set_name(&self, name: &str) -> Result<(), EditError> {
        set_name_of(self, name)
    }

    pub fn arguments(&self) -> Vec<Argument> {
        arguments_of(self)
    }

    /// The last argument with this name. Positional arguments are named by
    /// their position (`"1"`, `"2"`, ...).
    pub fn get_arg(&self, name: &str) -> Option<Argument> {
        let name = name.trim();
        named_arguments(self)
            .into_iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, arg)| arg)
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.get_arg(name).is_some()
    }

    /// Set the value of argument `name`, appending the argument if missing.
    /// A missing argument whose name is the next free position is added as
    /// a positional argument.
    pub fn set_arg(&self, name: &str, value: &str) -> Result<(), EditError> {
        let named = named_arguments(self);
        if let Some((_, arg)) = named.iter().rev().find(|(n, _)| n == name.trim()) {
            return arg.set_value(value);
        }
        let positional = named.iter().filter(|(_, arg)| arg.is_positional()).count();
        let next = (positional + 1).to_string();
        let text = if name.trim() == next && !value.contains('=') {
            format!("|{value}")
        } else {
            format!("|{name}={value}")
        };
        let at = append_point(self, 2);
        self.splice_local(at..at, &text)
    }

    /// Remove every argument named `name`.
    pub fn del_arg(&self, name: &str) -> Result<(), EditError> {
        let name = name.trim();
        for (_, arg) in named_arguments(self)
            .into_iter()
            .rev()
            .filter(|(n, _)| n == name)
        {
            arg.delete()?;
        }
        Ok(())
    }
}

impl ParserFunction {
    /// The function name, e.g. `#if`.
    pub fn name(&self) -> String {
        name_of(self)
    }

    pub fn set_name(&self, name: &str) -> Result<(), EditError> {
        set_name_of(self, name)
    }

    /// The arguments; the first one is delimited by `:`.
    pub fn arguments(&self) -> Vec<Argument> {
        arguments_of(self)
    }
}

impl Parameter {
    pub fn name(&self) -> String {
        name_of(self)
    }

    pub fn set_name(&self, name: &str) -> Result<(), EditError> {
        set_name_of(self, name)
    }

    /// Everything after the first `|`, or `None` without a default.
    pub fn default(&self) -> Option<String> {
        let (text, range) = self.default_range()?;
        Some(text[range].to_owned())
    }

    pub fn set_default(&self, default: &str) -> Result<(), EditError> {
        match self.default_range() {
            Some((_, range)) => self.splice_local(range, default),
            None => {
                let at = append_point(self, 3);
                self.splice_local(at..at, &format!("|{default}"))
            }
        }
    }

    fn default_range(&self) -> Option<(String, Range<usize>)> {
        let (text, inv) = invocation(self)?;
        let first = inv.arguments.first()?;
        let end = inv.arguments.last().map_or(first.end, |last| last.end);
        Some((text, first.start + 1..end))
    }
}

impl Argument {
    fn parts(&self) -> (String, brackets::ArgumentParts) {
        let (text, shadow, _) = own_shadow(self, Purpose::Parts);
        let parts = brackets::split_argument(&shadow);
        (text, parts)
    }

    fn explicit_name(&self) -> Option<String> {
        let (text, parts) = self.parts();
        parts.name.map(|name| text[name].to_owned())
    }

    /// The name as written, or the argument's position among the positional
    /// arguments of its owner.
    pub fn name(&self) -> String {
        if let Some(name) = self.explicit_name() {
            return name;
        }
        let owner = self
            .ancestors(None)
            .into_iter()
            .find(|a| a.kind().is_some_and(ConstructKind::is_invocation));
        owner
            .and_then(|owner| {
                named_arguments(&owner)
                    .into_iter()
                    .find(|(_, arg)| arg == self)
                    .map(|(name, _)| name)
            })
            .unwrap_or_else(|| "1".to_owned())
    }

    /// Rename the argument; a positional argument becomes a named one.
    pub fn set_name(&self, name: &str) -> Result<(), EditError> {
        match self.parts().1.name {
            Some(range) => self.splice_local(range, name),
            None => self.splice_local(1..1, &format!("{name}=")),
        }
    }

    pub fn value(&self) -> String {
        let (text, parts) = self.parts();
        text[parts.value].to_owned()
    }

    pub fn set_value(&self, value: &str) -> Result<(), EditError> {
        self.splice_local(self.parts().1.value, value)
    }

    pub fn is_positional(&self) -> bool {
        self.parts().1.name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn values(template: &Template) -> Vec<String> {
        template.arguments().iter().map(Argument::value).collect()
    }

    #[test]
    fn names_keep_their_whitespace() {
        let t = Template::new("{{ t\n |1=2}}");
        assert_eq!(t.name(), " t\n ");
        let arg = t.arguments().remove(0);
        t.set_name("t").unwrap();
        assert_eq!(t.text(), "{{t|1=2}}");
        assert_eq!(arg.text(), "|1=2");
    }

    #[test]
    fn extending_the_name_keeps_arguments() {
        let t = Template::new("{{t|a}}");
        let arg = t.arguments().remove(0);
        t.set_name("t\n    ").unwrap();
        assert_eq!(t.text(), "{{t\n    |a}}");
        assert_eq!(arg.text(), "|a");
    }

    #[test]
    fn nested_arguments_stay_with_their_template() {
        let t = Template::new("{{a|b={{c|d}}|e}}");
        assert_eq!(values(&t), vec!["{{c|d}}", "e"]);
        let inner = t.templates().remove(0);
        assert_eq!(values(&inner), vec!["d"]);
        let d = inner.arguments().remove(0);
        assert_eq!(values(&t), vec!["{{c|d}}", "e"]);
        assert!(!d.is_detached());
        assert_eq!(inner.arguments().remove(0), d);
    }

    #[rstest]
    #[case("{{t|a|b=c|d}}", "1", Some("a"))]
    #[case("{{t|a|b=c|d}}", "2", Some("d"))]
    #[case("{{t|a|b=c|d}}", " b ", Some("c"))]
    #[case("{{t|a=1|a=2}}", "a", Some("2"))]
    #[case("{{t|a}}", "2", None)]
    fn argument_lookup(#[case] text: &str, #[case] name: &str, #[case] value: Option<&str>) {
        let t = Template::new(text);
        assert_eq!(t.get_arg(name).map(|a| a.value()), value.map(str::to_owned));
    }

    #[test]
    fn overwriting_the_template_detaches_old_arguments() {
        let t = Template::new("{{t|a|b|c}}");
        let c = t.arguments().pop().unwrap();
        t.set_text("{{t|0|a|b|c}}").unwrap();
        assert_eq!(c.text(), "");
        assert_eq!(t.get_arg("1").unwrap().value(), "0");
        assert_eq!(t.get_arg("4").unwrap().value(), "c");
    }

    #[test]
    fn set_arg_updates_or_appends() {
        let t = Template::new("{{t|a=1}}");
        t.set_arg("a", "2").unwrap();
        assert_eq!(t.text(), "{{t|a=2}}");
        t.set_arg("1", "x").unwrap();
        assert_eq!(t.text(), "{{t|a=2|x}}");
        t.set_arg("b", "y").unwrap();
        assert_eq!(t.text(), "{{t|a=2|x|b=y}}");
        assert!(t.has_arg("b"));
    }

    #[test]
    fn del_arg_removes_every_duplicate() {
        let t = Template::new("{{t|a=1|b|a=2}}");
        t.del_arg("a").unwrap();
        assert_eq!(t.text(), "{{t|b}}");
        assert!(!t.has_arg("a"));
    }

    #[test]
    fn positional_names() {
        let t = Template::new("{{t|a|k=v|b}}");
        let names: Vec<String> = t.arguments().iter().map(Argument::name).collect();
        assert_eq!(names, vec!["1", "k", "2"]);
        let second = t.arguments().pop().unwrap();
        assert!(second.is_positional());
        second.set_name("n").unwrap();
        assert_eq!(t.text(), "{{t|a|k=v|n=b}}");
        assert_eq!(second.value(), "b");
    }

    #[test]
    fn parser_function_arguments() {
        let pf = ParserFunction::new("{{#if:a|b|c}}");
        assert_eq!(pf.name(), "#if");
        let values: Vec<String> = pf.arguments().iter().map(Argument::value).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
        assert_eq!(pf.arguments()[0].text(), ":a");
    }

    #[test]
    fn parameter_defaults() {
        let p = Parameter::new("{{{a}}}");
        assert_eq!(p.name(), "a");
        assert_eq!(p.default(), None);
        p.set_default("x").unwrap();
        assert_eq!(p.text(), "{{{a|x}}}");
        assert_eq!(p.default().as_deref(), Some("x"));
        p.set_default("y|z").unwrap();
        assert_eq!(p.text(), "{{{a|y|z}}}");
        p.set_name("b").unwrap();
        assert_eq!(p.text(), "{{{b|y|z}}}");
    }

    #[test]
    fn standalone_argument() {
        let arg = Argument::new("|k=v");
        assert_eq!(arg.name(), "k");
        arg.set_value("w").unwrap();
        assert_eq!(arg.text(), "|k=w");
        assert_eq!(Argument::new("|v").name(), "1");
    }
}
