use std::collections::HashSet;
use ap_core::placeholder::split_on_placeholders;
use ap_core::{BodySegment, EnrichedArticle, ImageReference, PublishRequest};

/// Lay out the editor body: the i-th placeholder becomes the i-th image.
///
/// Placeholders without a matching image are dropped. When the body has no
/// placeholder at all, the first image leads the article.
pub fn compose_body(article: &EnrichedArticle, images: &[ImageReference]) -> Vec<BodySegment> {
    let alt_for = |i: usize| {
        images[i]
            .alt
            .clone()
            .or_else(|| article.alt_texts.get(i).cloned())
            .unwrap_or_else(|| article.title.clone())
    };
    let image_segment = |i: usize| BodySegment::Image {
        url: images[i].url.clone(),
        alt: alt_for(i),
    };

    let pieces = split_on_placeholders(&article.html);
    let mut segments = Vec::with_capacity(pieces.len() + images.len());

    if pieces.len() == 1 {
        if !images.is_empty() {
            segments.push(image_segment(0));
        }
        push_html(&mut segments, pieces[0]);
        return segments;
    }

    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 && i - 1 < images.len() {
            segments.push(image_segment(i - 1));
        }
        push_html(&mut segments, piece);
    }
    segments
}

fn push_html(segments: &mut Vec<BodySegment>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        segments.push(BodySegment::Html(piece.to_string()));
    }
}

/// Case-insensitive dedupe, capped at `max_tags`.
pub fn select_tags(tags: &[String], max_tags: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .take(max_tags)
        .map(String::from)
        .collect()
}

pub fn build_request(
    article: &EnrichedArticle,
    images: &[ImageReference],
    source_link: &str,
    max_tags: usize,
) -> PublishRequest {
    PublishRequest {
        title: article.title.clone(),
        segments: compose_body(article, images),
        tags: select_tags(&article.tags, max_tags),
        source_link: source_link.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::ImageOrigin;

    fn article(html: &str) -> EnrichedArticle {
        EnrichedArticle {
            title: "Lemon Tart".to_string(),
            html: html.to_string(),
            tags: vec![],
            alt_texts: vec!["Whole tart".to_string()],
            enriched: true,
        }
    }

    fn image(name: &str) -> ImageReference {
        ImageReference {
            url: format!("https://food.example.com/{}.jpg", name),
            alt: None,
            origin: ImageOrigin::FeedMetadata,
        }
    }

    #[test]
    fn test_two_placeholders_two_images() {
        let html = "<p>Intro</p><!-- IMAGE 1 PLACEHOLDER --><p>Middle</p><!-- IMAGE 2 PLACEHOLDER --><p>End</p>";
        let segments = compose_body(&article(html), &[image("a"), image("b")]);
        assert_eq!(
            segments,
            vec![
                BodySegment::Html("<p>Intro</p>".to_string()),
                BodySegment::Image { url: "https://food.example.com/a.jpg".to_string(), alt: "Whole tart".to_string() },
                BodySegment::Html("<p>Middle</p>".to_string()),
                BodySegment::Image { url: "https://food.example.com/b.jpg".to_string(), alt: "Lemon Tart".to_string() },
                BodySegment::Html("<p>End</p>".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_placeholder_is_replaced_by_its_image() {
        let token = ap_core::placeholder::placeholder_token(1);
        let html = format!("<p>Intro</p>{}<p>Body</p>", token);
        let segments = compose_body(&article(&html), &[image("a")]);
        assert!(matches!(&segments[1], BodySegment::Image { url, .. } if url.ends_with("a.jpg")));
        assert!(segments
            .iter()
            .all(|s| !matches!(s, BodySegment::Html(h) if h.contains(&token))));
    }

    #[test]
    fn test_body_without_placeholder_is_unchanged() {
        let html = "<p>No markers here</p><p>Second paragraph</p>";
        assert_eq!(compose_body(&article(html), &[]), vec![BodySegment::Html(html.to_string())]);
    }

    #[test]
    fn test_placeholders_without_images_are_dropped() {
        let html = "<p>Intro</p><!-- IMAGE 1 PLACEHOLDER --><p>Middle</p><!-- IMAGE 2 PLACEHOLDER --><p>End</p>";
        let segments = compose_body(&article(html), &[image("a")]);
        assert_eq!(segments.len(), 4);
        assert!(matches!(segments[1], BodySegment::Image { .. }));
        assert_eq!(segments[3], BodySegment::Html("<p>End</p>".to_string()));

        let segments = compose_body(&article(html), &[]);
        assert!(segments.iter().all(|s| matches!(s, BodySegment::Html(_))));
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_no_placeholder_leads_with_image() {
        let segments = compose_body(&article("<p>Original body</p>"), &[image("a"), image("b")]);
        assert_eq!(segments.len(), 2);
        assert!(matches!(&segments[0], BodySegment::Image { url, .. } if url.ends_with("a.jpg")));

        let segments = compose_body(&article("<p>Original body</p>"), &[]);
        assert_eq!(segments, vec![BodySegment::Html("<p>Original body</p>".to_string())]);
    }

    #[test]
    fn test_image_alt_wins_over_generated_alt() {
        let mut img = image("a");
        img.alt = Some("From the page".to_string());
        let segments = compose_body(&article("<!-- IMAGE 1 PLACEHOLDER --><p>x</p>"), &[img]);
        assert!(matches!(&segments[0], BodySegment::Image { alt, .. } if alt == "From the page"));
    }

    #[test]
    fn test_select_tags() {
        let tags: Vec<String> = ["Baking", "baking", " ", "Dessert", "Lemon", "Tart", "Easy", "Summer"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(select_tags(&tags, 5), vec!["Baking", "Dessert", "Lemon", "Tart", "Easy"]);
        assert!(select_tags(&tags, 0).is_empty());
    }

    #[test]
    fn test_build_request() {
        let mut a = article("<p>Body</p>");
        a.tags = vec!["Food".to_string()];
        let request = build_request(&a, &[], "https://food.example.com/tart", 5);
        assert_eq!(request.title, "Lemon Tart");
        assert_eq!(request.tags, vec!["Food"]);
        assert_eq!(request.source_link, "https://food.example.com/tart");
        assert_eq!(request.segments.len(), 1);
    }
}
