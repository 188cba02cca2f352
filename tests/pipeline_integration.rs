use markedit::grammar::{DefinitionExtension, Grammar, StrongSuffix};
use markedit::pipeline::{PipelineConfig, RenderPipeline};
use proptest::prelude::*;

fn strip_tags(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[test]
fn test_definition_renders_exact_fragment() {
    let grammar = Grammar::builder().extension(DefinitionExtension).build();
    assert_eq!(
        grammar.parse_inline("{hello world|lasts 3 hours}"),
        "\n<dt>hello world</dt><dd>lasts 3 hours</dd>"
    );
}

#[test]
fn test_script_is_removed_from_every_position() {
    let pipeline = RenderPipeline::default();
    for doc in [
        "<script>alert(1)</script>",
        "text <script>alert(1)</script> more",
        "> <script>alert(1)</script>",
        "- <script>alert(1)</script>",
        "{<script>alert(1)</script>|x}",
        "[x](javascript:alert(1))",
    ] {
        let html = pipeline.render(doc);
        assert!(!html.as_str().contains("<script>"), "{doc:?} -> {html}");
        assert!(!html.as_str().contains("alert(1)</script>"), "{doc:?} -> {html}");
        assert!(!html.as_str().contains("javascript:"), "{doc:?} -> {html}");
    }
}

#[test]
fn test_sample_document_renders() {
    let doc = include_str!("fixtures/sample.md");
    let html = RenderPipeline::default().render(doc);
    let html = html.as_str();
    assert!(html.contains("<h1>Weekly notes</h1>"), "{html}");
    assert!(html.contains("<dt>standup</dt><dd>15 min</dd>"), "{html}");
    assert!(html.contains("<strong>Ship it walked</strong>"), "{html}");
    assert!(html.contains(r#"<code class="language-rust">"#), "{html}");
    assert!(!html.contains("onclick"), "{html}");
}

#[test]
fn test_pipelines_with_different_grammars_coexist() {
    let plain = RenderPipeline::standard(&PipelineConfig::plain());
    let rich = RenderPipeline::default();
    std::thread::scope(|scope| {
        let a = scope.spawn(|| plain.render("**x** {a|b}"));
        let b = scope.spawn(|| rich.render("**x** {a|b}"));
        let a = a.join().unwrap();
        let b = b.join().unwrap();
        assert!(!a.as_str().contains("<dt>"));
        assert!(a.as_str().contains("<strong>x</strong>"));
        assert!(b.as_str().contains("<dt>a</dt>"));
        assert!(b.as_str().contains("<strong>x walked</strong>"));
    });
}

#[test]
fn test_walkers_compose_in_order() {
    let grammar = Grammar::builder()
        .walker(StrongSuffix::new("1"))
        .walker(StrongSuffix::new("2"))
        .build();
    assert_eq!(grammar.parse("**x**"), "<p><strong>x12</strong></p>\n");
}

/// The base grammar agrees with comrak on plain CommonMark.
#[test]
fn test_ordered_list_keeps_every_item() {
    let html = RenderPipeline::default().render("1. first\n2. second\n3. third");
    assert_eq!(html.as_str().matches("<li>").count(), 3, "{html}");
    assert!(html.as_str().contains("<li>third</li>"), "{html}");
}

#[test]
fn test_base_grammar_matches_comrak() {
    let grammar = Grammar::base();
    let options = comrak::Options::default();
    for doc in [
        "# Title\n\nSome text.",
        "## Sub\n\n*em* and **strong** and `code`",
        "- one\n- two\n- three",
        "1. first\n2. second",
        "1. first\n2. second\n3. third",
        "> quoted\n> text",
        "```rust\nfn main() {}\n```",
        "[link](https://example.com) after",
        "para one\n\npara two",
    ] {
        assert_eq!(
            grammar.parse(doc),
            comrak::markdown_to_html(doc, &options),
            "mismatch for {doc:?}"
        );
    }
}

proptest! {
    #[test]
    fn plain_text_round_trips(text in "[a-zA-Z][a-zA-Z0-9 ]{0,40}") {
        let html = RenderPipeline::default().render(&text);
        let stripped = strip_tags(html.as_str());
        prop_assert_eq!(stripped.trim(), text.trim());
    }

    #[test]
    fn well_formed_format_token_yields_one_pair(
        term in "[a-z][a-z0-9 ]{0,10}[a-z]",
        definition in "[a-z0-9][a-z0-9 ]{0,10}[a-z0-9]",
    ) {
        let html = RenderPipeline::default().render(&format!("{{{term}|{definition}}}"));
        let html = html.as_str();
        prop_assert_eq!(html.matches("<dt>").count(), 1);
        prop_assert_eq!(html.matches("<dd>").count(), 1);
        let expected_dt = format!("<dt>{}</dt>", term.trim());
        prop_assert!(html.contains(&expected_dt), "{}", html);
    }

    #[test]
    fn rendering_is_idempotent(doc in "[a-z*_{}|#>\\-\n ]{0,60}") {
        let pipeline = RenderPipeline::default();
        prop_assert_eq!(pipeline.render(&doc), pipeline.render(&doc));
    }
}
