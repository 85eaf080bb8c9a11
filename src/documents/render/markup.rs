//! Typst source emitted from a page tree.
//!
//! Every node becomes one Typst code-mode expression. Text is passed as
//! string literals so user data can never be interpreted as markup.

use std::collections::HashMap;
use std::fmt::Write;

use crate::documents::format::escape_typst_string;
use crate::documents::layout::tree::{Align, BoxStyle, Layout, TextSize, TextStyle};
use crate::documents::layout::{DocumentTree, Node};

const PAGE_SPACING_PT: u16 = 10;

/// Remote image URL to the file name it was downloaded to.
pub type ImageMap = HashMap<String, String>;

pub fn to_typst(tree: &DocumentTree, images: &ImageMap) -> String {
    let mut out = String::new();
    out.push_str("#set page(paper: \"a4\", margin: (x: 1.8cm, y: 1.6cm))\n");
    out.push_str("#set text(size: 10pt, lang: \"es\")\n");
    let _ = writeln!(out, "#set document(title: \"{}\")", escape_typst_string(&tree.title));

    for (index, page) in tree.pages.iter().enumerate() {
        if index > 0 {
            out.push_str("#pagebreak()\n");
        }
        let _ = writeln!(out, "#stack(dir: ttb, spacing: {PAGE_SPACING_PT}pt,");
        for node in &page.content {
            write_node(&mut out, node, images, 1);
            out.push_str(",\n");
        }
        out.push_str(")\n");
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_node(out: &mut String, node: &Node, images: &ImageMap, depth: usize) {
    indent(out, depth);
    match node {
        Node::Text { content, style } => out.push_str(&text_expr(content, style)),
        Node::Image { source, width_pt } => match images.get(source) {
            Some(file) => {
                let _ = write!(out, "image(\"{}\", width: {width_pt}pt)", escape_typst_string(file));
            }
            None => {
                let _ = write!(out, "block(width: {width_pt}pt, height: 0pt)");
            }
        },
        Node::Blank { height_pt } => {
            let _ = write!(out, "block(width: 100%, height: {height_pt}pt)");
        }
        Node::Container {
            layout,
            style,
            children,
            ..
        } => {
            let open = match layout {
                Layout::Stack => format!("stack(dir: ttb, spacing: {}pt,\n", style.gap_pt),
                Layout::Grid { columns } => {
                    let fractions: Vec<String> = columns.iter().map(|c| format!("{c}fr")).collect();
                    format!(
                        "grid(columns: ({},), gutter: {}pt,\n",
                        fractions.join(", "),
                        style.gap_pt
                    )
                }
            };
            let framed = style.border || style.shade.is_some();
            if framed {
                out.push_str(&block_open(style));
            }
            out.push_str(&open);
            for child in children {
                write_node(out, child, images, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(')');
            if framed {
                out.push(')');
            }
        }
    }
}

fn block_open(style: &BoxStyle) -> String {
    let mut args = vec!["width: 100%".to_string()];
    if style.border {
        args.push("stroke: 0.5pt + luma(160)".to_string());
    }
    if let Some(shade) = style.shade {
        args.push(format!("fill: luma({shade})"));
    }
    if style.padding_pt > 0 {
        args.push(format!("inset: {}pt", style.padding_pt));
    }
    format!("block({}, ", args.join(", "))
}

fn text_expr(content: &str, style: &TextStyle) -> String {
    let size = match style.size {
        TextSize::Small => 8,
        TextSize::Body => 10,
        TextSize::Heading => 12,
        TextSize::Title => 16,
    };
    let mut args = format!("size: {size}pt");
    if style.bold {
        args.push_str(", weight: \"bold\"");
    }
    if style.italic {
        args.push_str(", style: \"italic\"");
    }
    let text = format!("text({args}, \"{}\")", escape_typst_string(content));
    match style.align {
        Align::Left => text,
        Align::Center => format!("align(center, {text})"),
        Align::Right => format!("align(right, {text})"),
        Align::Justify => format!("par(justify: true, {text})"),
    }
}
