//! Note bodies → ratatui `Text`.
//!
//! Walks `pulldown_cmark` events and builds styled lines. Covers what notes
//! actually contain: headings, emphasis, inline and fenced code, nested
//! lists, checklists, quotes, rules and links. Colors come from the active
//! `Palette` so the `mono` theme stays colorless.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::tui::theme::Palette;

/// Render `content` into owned lines.
pub fn render(content: &str, palette: &Palette) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut w = Writer::new(palette);
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    w.text
}

// ── Writer ──────────────────────────────────────────────────────────────────

struct Writer<'p> {
    text: Text<'static>,
    palette: &'p Palette,
    /// Inline styles, composed with `patch` so bold inside italic works.
    styles: Vec<Style>,
    /// Spans repeated at the start of every line (quote bar, code gutter).
    gutters: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = numbered list at n.
    lists: Vec<Option<u64>>,
    /// One entry per open list item: whether it carries a task marker.
    items: Vec<bool>,
    in_code: bool,
    link_url: Option<String>,
    /// Separate the next block with a blank line.
    pending_gap: bool,
}

impl<'p> Writer<'p> {
    fn new(palette: &'p Palette) -> Self {
        Self {
            text: Text::default(),
            palette,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            items: Vec::new(),
            in_code: false,
            link_url: None,
            pending_gap: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.palette.text))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn muted(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    fn new_line(&mut self, mut line: Line<'static>) {
        for gutter in self.gutters.iter().rev() {
            line.spans.insert(0, gutter.clone());
        }
        self.text.lines.push(line);
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.text.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(Line::from(span)),
        }
    }

    fn gap(&mut self) {
        if self.pending_gap {
            self.new_line(Line::default());
            self.pending_gap = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => {
                let style = Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD);
                self.push_span(Span::styled(c.to_string(), style));
            }
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.new_line(Line::default()),
            Event::Rule => {
                self.gap();
                self.new_line(Line::from(Span::styled("─".repeat(32), self.muted())));
                self.pending_gap = true;
            }
            Event::TaskListMarker(done) => {
                // Replaces the bullet pushed by `Tag::Item`.
                if let Some(line) = self.text.lines.last_mut()
                    && let Some(bullet) = line.spans.last_mut()
                {
                    let indent = bullet.content.trim_end_matches("• ").to_string();
                    let (mark, color) = if done {
                        ("☑ ", self.palette.success)
                    } else {
                        ("☐ ", self.palette.muted)
                    };
                    *bullet = Span::styled(format!("{indent}{mark}"), Style::default().fg(color));
                }
                if let Some(task) = self.items.last_mut() {
                    *task = true;
                }
                if done {
                    self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
                } else {
                    self.push_style(Style::default());
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.gap();
                if self.lists.is_empty() {
                    self.new_line(Line::default());
                }
            }
            Tag::Heading { level, .. } => {
                self.gap();
                let style = heading_style(self.palette, level);
                self.new_line(Line::default());
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.gap();
                self.gutters.push(Span::styled("▎ ", self.muted()));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.gap();
                let label = match &kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => format!("┌ {lang}"),
                    _ => "┌".to_string(),
                };
                self.new_line(Line::from(Span::styled(label, self.muted())));
                self.gutters.push(Span::styled("│ ", self.muted()));
                self.in_code = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.gap();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.items.push(false);
                self.new_line(Line::default());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let s = format!("{indent}{n}. ");
                        *n += 1;
                        s
                    }
                    _ => format!("{indent}• "),
                };
                let style = self.muted();
                self.push_span(Span::styled(bullet, style));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(self.palette.accent)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_gap = self.lists.is_empty(),
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.styles.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.in_code = false;
                self.gutters.pop();
                self.new_line(Line::from(Span::styled("└", self.muted())));
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.pending_gap = true;
                }
            }
            TagEnd::Item => {
                if self.items.pop() == Some(true) {
                    self.styles.pop();
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.link_url.take() {
                    let style = self.muted();
                    self.push_span(Span::styled(format!(" <{url}>"), style));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders tabs as zero width
        let text = cow.replace('\t', "    ");

        if self.in_code {
            let style = Style::default().fg(self.palette.text);
            for line in text.lines() {
                self.new_line(Line::from(Span::styled(line.to_string(), style)));
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }
}

fn heading_style(palette: &Palette, level: HeadingLevel) -> Style {
    let base = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => base,
        _ => Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
    }
}
