use mdrender::marker::image_reference;
use mdrender::{Chunk, Chunker, Document, Marker, Mode, fingerprint, join};

fn languages() -> Vec<String> {
    vec!["dot".to_string(), "plantuml".to_string()]
}

fn split(text: &str) -> Vec<Chunk> {
    Chunker::new(&languages(), 0)
        .split(&Document::parse(text))
        .expect("split failed")
}

fn lines(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Spans must tile the document: contiguous, in order, no gaps.
fn assert_covers(chunks: &[Chunk], line_count: usize) {
    let mut next = 0;
    for chunk in chunks {
        assert_eq!(chunk.span().start, next, "gap or overlap at {:?}", chunk.span());
        assert!(chunk.span().end > chunk.span().start, "empty chunk {:?}", chunk.span());
        next = chunk.span().end;
    }
    assert_eq!(next, line_count);
}

#[test]
fn document_without_directives_is_one_ordinary_chunk() {
    let text = "# Title\n\n```rust\nfn main() {}\n```\n";
    let chunks = split(text);
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].as_renderable().is_none());
    assert_eq!(join(&chunks), text);
}

#[test]
fn empty_document() {
    let chunks = split("");
    assert_eq!(join(&chunks), "");
    assert_covers(&chunks, 1);
}

#[test]
fn fresh_normal_block() {
    let chunks = split("line A\n```dot render\ndigraph { a -> b }\n```\nline B");
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].lines(), lines(&["line A"]).as_slice());
    assert_eq!(chunks[2].lines(), lines(&["line B"]).as_slice());

    let chunk = chunks[1].as_renderable().unwrap();
    assert_eq!(chunk.language, "dot");
    assert_eq!(chunk.mode(), Mode::Normal);
    assert_eq!(chunk.body, lines(&["digraph { a -> b }"]));
    assert_eq!(chunk.span, 1..4);
    assert_eq!(chunk.previous, None);
    assert_eq!(chunk.marker_offset, 0);
    assert_eq!(
        chunk.lines,
        lines(&["<!-- image here -->", "", "```dot render", "digraph { a -> b }", "```"])
    );
    assert!(chunk.is_stale());
}

#[test]
fn previously_rendered_block_reassembles_unchanged() {
    let hash = fingerprint(&["digraph { a -> b }"]);
    let image = image_reference(&format!("render-{}.svg", hash), "");
    let text = format!(
        "line A\n{}\n\n```dot render\ndigraph {{ a -> b }}\n```\nline B\n",
        image
    );

    let chunks = split(&text);
    let chunk = chunks[1].as_renderable().unwrap();
    assert_eq!(chunk.span, 1..6);
    assert_eq!(chunk.previous, Some(Marker::Fingerprinted(hash.clone())));
    assert_eq!(chunk.previous_fingerprint(), Some(hash.as_str()));
    assert!(!chunk.is_stale());
    assert_eq!(join(&chunks), text);
}

#[test]
fn marker_directly_above_fence_is_accepted() {
    let hash = fingerprint(&["body"]);
    let text = format!("![render-{0}.svg](render-{0}.svg)\n```dot render\nbody\n```", hash);

    let chunks = split(&text);
    assert_eq!(chunks.len(), 1);
    let chunk = chunks[0].as_renderable().unwrap();
    assert_eq!(chunk.span, 0..4);
    assert_eq!(chunk.marker_offset, 0);
    assert!(!chunk.is_stale());
}

#[test]
fn edited_body_is_stale() {
    let hash = fingerprint(&["digraph { a -> b }"]);
    let text = format!(
        "![render-{0}.svg](render-{0}.svg)\n\n```dot render\ndigraph {{ a -> c }}\n```",
        hash
    );
    let chunks = split(&text);
    let chunk = chunks[0].as_renderable().unwrap();
    assert!(chunk.is_rendered_before());
    assert!(chunk.is_stale());
}

#[test]
fn chunks_cover_mixed_document() {
    let hash = fingerprint(&["b"]);
    let text = format!(
        "intro\n```dot render\na\n```\ntext\n![render-{0}.svg](render-{0}.svg)\n\n```dot render {{\"mode\": \"normal\"}}\nb\n```\n```plantuml render {{\"mode\": \"image-collapsed\"}}\n@startuml\n@enduml\n```\nend\n",
        hash
    );
    let document = Document::parse(&text);
    let chunks = split(&text);

    assert_covers(&chunks, document.len());
    let renderable: Vec<_> = chunks.iter().filter_map(Chunk::as_renderable).collect();
    assert_eq!(renderable.len(), 3);
    assert_eq!(renderable[2].language, "plantuml");
    assert_eq!(renderable[2].mode(), Mode::ImageCollapsed);
}

#[test]
fn wrapper_lookup_does_not_reach_into_previous_chunk() {
    // Without the floor, the second block would claim line 1 as its marker.
    let marker = format!("![render-{0}.svg](render-{0}.svg)", "a".repeat(32));
    let text = format!(
        "```dot render\n{}\n```\n<!--\n```dot render {{\"mode\": \"code-hidden\"}}\nb\n```\n-->",
        marker
    );
    let chunks = split(&text);

    assert_covers(&chunks, 8);
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[0].span(), &(0..3));
    assert_eq!(chunks[1].lines(), lines(&["<!--"]).as_slice());
    let second = chunks[2].as_renderable().unwrap();
    assert_eq!(second.span, 4..7);
    assert_eq!(second.previous, None);
}

#[test]
fn other_languages_and_keywords_pass_through() {
    for text in [
        "```mermaid render\ngraph TD\n```",
        "```dot renderer\ndigraph {}\n```",
        "```dotty render\ndigraph {}\n```",
        "```dot\ndigraph {}\n```",
        "```dot render please\ndigraph {}\n```",
    ] {
        let chunks = split(text);
        assert_eq!(chunks.len(), 1, "{}", text);
        assert!(chunks[0].as_renderable().is_none(), "{}", text);
    }
}

#[test]
fn lines_inside_a_claimed_chunk_are_not_rescanned() {
    // The body contains something that looks like a directive.
    let text = "```dot render\n```dot render\n```\nafter";
    let chunks = split(text);
    assert_eq!(chunks.len(), 2);
    let chunk = chunks[0].as_renderable().unwrap();
    assert_eq!(chunk.body, lines(&["```dot render"]));
    assert_eq!(chunks[1].lines(), lines(&["after"]).as_slice());
}

#[test]
fn explicit_filename_detects_any_image() {
    let text = "![diagram](img/arch.svg)\n\n```dot render {\"filename\": \"arch.svg\"}\ndigraph {}\n```";
    let chunks = split(text);
    let chunk = chunks[0].as_renderable().unwrap();
    assert_eq!(chunk.options.filename.as_deref(), Some("arch.svg"));
    assert_eq!(chunk.previous, Some(Marker::Named));
    assert_eq!(chunk.span, 0..5);
    assert!(chunk.is_stale());
}

#[test]
fn unterminated_block_is_a_parse_error() {
    let text = "intro\n```dot render\ndigraph {}\n";
    let error = Chunker::new(&languages(), 0)
        .split(&Document::parse(text))
        .unwrap_err();
    assert!(error.message.contains("unterminated"), "{}", error.message);
    assert_eq!(error.span, 6..19);
    assert_eq!(&text[error.span.clone()], "```dot render");
}

#[test]
fn malformed_options_are_parse_errors() {
    for (fence, expected) in [
        ("```dot render {mode: normal}", "malformed render options"),
        ("```dot render {\"mode\": \"sideways\"}", "malformed render options"),
        ("```dot render {\"colour\": \"red\"}", "malformed render options"),
        ("```dot render {\"mode\": \"normal\"", "must end with"),
        ("```dot render {\"filename\": \"../x.svg\"}", "invalid render filename"),
        ("```dot render {\"filename\": \"\"}", "invalid render filename"),
    ] {
        let text = format!("{}\nbody\n```", fence);
        let error = Chunker::new(&languages(), 0)
            .split(&Document::parse(&text))
            .unwrap_err();
        assert!(
            error.message.contains(expected),
            "{}: expected {:?}, got {:?}",
            fence,
            expected,
            error.message
        );
    }
}

#[test]
fn unknown_mode_note_lists_variants() {
    let text = "```dot render {\"mode\": \"sideways\"}\nbody\n```";
    let error = Chunker::new(&languages(), 0)
        .split(&Document::parse(text))
        .unwrap_err();
    assert!(error.notes.iter().any(|n| n.contains("unknown variant")), "{:?}", error.notes);
}

#[test]
fn options_may_follow_render_without_space() {
    let chunks = split("```dot render{\"mode\": \"code-hidden\"}\nbody\n```");
    assert_eq!(chunks[0].as_renderable().unwrap().mode(), Mode::CodeHidden);
}
