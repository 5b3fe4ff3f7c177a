//! Structured view model rendered by pages and printed by the shell.

use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub id: String,
    pub label: String,
    pub disabled: bool,
}

impl Button {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Select { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: String,
    pub hint: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            value: String::new(),
            hint: None,
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Heading {
        text: String,
    },
    Text {
        text: String,
    },
    /// Inline notice, e.g. a load failure or a login error
    Banner {
        tone: Tone,
        text: String,
    },
    Badge {
        tone: Tone,
        text: String,
    },
    Spinner,
    Link(Link),
    Button(Button),
    /// Dashboard tile
    Stat {
        label: String,
        value: Option<String>,
        link: Link,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    List {
        items: Vec<String>,
    },
    /// Named region a page fills in after its data arrives
    Section {
        id: String,
        children: Vec<Node>,
    },
    Form {
        id: String,
        fields: Vec<Field>,
        actions: Vec<Button>,
    },
    Modal {
        id: String,
        title: String,
        children: Vec<Node>,
    },
    Nav {
        brand: String,
        links: Vec<Link>,
        role: String,
        logout: Button,
    },
}

impl Node {
    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading { text: text.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn banner(tone: Tone, text: impl Into<String>) -> Self {
        Self::Banner {
            tone,
            text: text.into(),
        }
    }

    pub fn section(id: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Section {
            id: id.into(),
            children,
        }
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        match self {
            Self::Section { children, .. } | Self::Modal { children, .. } => {
                for child in children {
                    child.walk(visit);
                }
            }
            _ => {}
        }
    }
}

/// Everything a page currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct View {
    pub title: String,
    pub nodes: Vec<Node>,
    /// Transient notice, the equivalent of a blocking alert
    pub alert: Option<String>,
}

impl View {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn push(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Generic failure view with a manual reload
    pub fn error_page() -> Self {
        View::new("Error")
            .push(Node::heading("Error"))
            .push(Node::text("Something went wrong. Please try again."))
            .push(Node::Button(Button::new("reload", "Reload")))
    }

    fn visit<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        for node in &self.nodes {
            node.walk(visit);
        }
    }

    /// Find a section by id anywhere in the tree
    pub fn section(&self, id: &str) -> Option<&[Node]> {
        let mut found = None;
        self.visit(&mut |node| {
            if let Node::Section { id: sid, children } = node {
                if found.is_none() && sid == id {
                    found = Some(children.as_slice());
                }
            }
        });
        found
    }

    pub fn modal(&self, id: &str) -> Option<&Node> {
        let mut found = None;
        self.visit(&mut |node| {
            if matches!(node, Node::Modal { id: mid, .. } if mid == id) && found.is_none() {
                found = Some(node);
            }
        });
        found
    }

    /// Find a button by id, including buttons inside forms and the nav bar
    pub fn button(&self, id: &str) -> Option<&Button> {
        let mut found = None;
        self.visit(&mut |node| {
            if found.is_some() {
                return;
            }
            match node {
                Node::Button(button) if button.id == id => found = Some(button),
                Node::Form { actions, .. } => {
                    found = actions.iter().find(|b| b.id == id);
                }
                Node::Nav { logout, .. } if logout.id == id => found = Some(logout),
                _ => {}
            }
        });
        found
    }

    /// Find a form field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        let mut found = None;
        self.visit(&mut |node| {
            if let Node::Form { fields, .. } = node {
                if found.is_none() {
                    found = fields.iter().find(|f| f.name == name);
                }
            }
        });
        found
    }

    /// Swap the children of a section; false when no such section exists
    pub fn replace_section(&mut self, id: &str, children: Vec<Node>) -> bool {
        fn replace(nodes: &mut [Node], id: &str, children: &mut Option<Vec<Node>>) -> bool {
            for node in nodes.iter_mut() {
                match node {
                    Node::Section {
                        id: sid,
                        children: current,
                    } => {
                        if sid.as_str() == id {
                            if let Some(new) = children.take() {
                                *current = new;
                            }
                            return true;
                        }
                        if replace(current, id, children) {
                            return true;
                        }
                    }
                    Node::Modal {
                        children: nested, ..
                    } => {
                        if replace(nested, id, children) {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
            false
        }

        let mut children = Some(children);
        replace(&mut self.nodes, id, &mut children)
    }

    /// Whether the rendered text contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.to_string().contains(needle)
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match node {
        Node::Heading { text } => writeln!(out, "{pad}== {text} =="),
        Node::Text { text } => writeln!(out, "{pad}{text}"),
        Node::Banner { tone, text } => {
            let marker = match tone {
                Tone::Danger => "!",
                Tone::Warning => "~",
                _ => "*",
            };
            writeln!(out, "{pad}[{marker}] {text}")
        }
        Node::Badge { text, .. } => writeln!(out, "{pad}({text})"),
        Node::Spinner => writeln!(out, "{pad}Loading..."),
        Node::Link(link) => writeln!(out, "{pad}{} -> {}", link.label, link.href),
        Node::Button(button) => write_button(out, &pad, button),
        Node::Stat { label, value, link } => writeln!(
            out,
            "{pad}{label}: {}  ({} -> {})",
            value.as_deref().unwrap_or("..."),
            link.label,
            link.href
        ),
        Node::Table { headers, rows } => {
            writeln!(out, "{pad}{}", headers.join(" | "))?;
            for row in rows {
                writeln!(out, "{pad}{}", row.join(" | "))?;
            }
            Ok(())
        }
        Node::List { items } => {
            for item in items {
                writeln!(out, "{pad}- {item}")?;
            }
            Ok(())
        }
        Node::Section { children, .. } => {
            for child in children {
                write_node(out, child, depth)?;
            }
            Ok(())
        }
        Node::Form {
            fields, actions, ..
        } => {
            for field in fields {
                let shown = match field.kind {
                    FieldKind::Password => "*".repeat(field.value.chars().count()),
                    _ => field.value.clone(),
                };
                write!(out, "{pad}{}: [{}]", field.label, shown)?;
                if let FieldKind::Select { options } = &field.kind {
                    write!(out, " ({})", options.join("/"))?;
                }
                if let Some(hint) = &field.hint {
                    write!(out, "  {hint}")?;
                }
                writeln!(out)?;
            }
            for button in actions {
                write_button(out, &pad, button)?;
            }
            Ok(())
        }
        Node::Modal {
            title, children, ..
        } => {
            writeln!(out, "{pad}+-- {title} --+")?;
            for child in children {
                write_node(out, child, depth + 1)?;
            }
            writeln!(out, "{pad}+------+")
        }
        Node::Nav {
            brand,
            links,
            role,
            logout,
        } => {
            let links: Vec<String> = links
                .iter()
                .map(|l| format!("{} ({})", l.label, l.href))
                .collect();
            writeln!(out, "{pad}{brand} | {} | {role} | <{}>", links.join(" "), logout.label)
        }
    }
}

fn write_button(out: &mut String, pad: &str, button: &Button) -> fmt::Result {
    if button.disabled {
        writeln!(out, "{pad}<{}> (disabled)", button.label)
    } else {
        writeln!(out, "{pad}<{}>", button.label)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node, 0)?;
        }
        if let Some(alert) = &self.alert {
            writeln!(out, ">> {alert}")?;
        }
        f.write_str(&out)
    }
}

/// The region pages render into
#[derive(Clone, Default)]
pub struct Container {
    view: Arc<RwLock<View>>,
    renders: Arc<AtomicUsize>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole view
    pub async fn set(&self, view: View) {
        *self.view.write().await = view;
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    /// Modify the view in place
    pub async fn update(&self, f: impl FnOnce(&mut View)) {
        f(&mut *self.view.write().await);
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> View {
        self.view.read().await.clone()
    }

    /// How many times the container has been written
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}
