use super::*;

fn article_page() -> (Document, NodeId, NodeId, NodeId) {
    let mut doc = Document::new("https://www.facebook.com/");
    let body = doc.body();
    let article = doc.append(body, "div", &[("role", "article")]).unwrap();
    let message = doc
        .append_with_text(article, "div", &[("data-ad-preview", "message")], "Great day!")
        .unwrap();
    let form = doc.append(article, "form", &[]).unwrap();
    let input = doc
        .append(form, "div", &[("contenteditable", "true"), ("role", "textbox")])
        .unwrap();
    (doc, article, message, input)
}

#[test]
fn test_query_all_document_order() {
    let (doc, article, message, _) = article_page();
    let divs = doc.query_all(&Selector::tag("div"));
    assert_eq!(divs[0], article);
    assert_eq!(divs[1], message);
    assert_eq!(divs.len(), 3);
}

#[test]
fn test_query_within_excludes_scope() {
    let (doc, article, message, _) = article_page();
    let found = doc.query_within(article, &Selector::attr("role"));
    assert_eq!(found.len(), 1);
    assert_ne!(found[0], article);
    assert!(!found.contains(&message));
}

#[test]
fn test_closest_is_inclusive() {
    let (doc, article, _, input) = article_page();
    let selector = Selector::attr_eq("role", "article");
    assert_eq!(doc.closest(input, &selector), Some(article));
    assert_eq!(doc.closest(article, &selector), Some(article));
    assert_eq!(doc.closest(doc.body(), &selector), None);
}

#[test]
fn test_text_content_concatenates_descendants() {
    let (mut doc, article, message, _) = article_page();
    doc.append_with_text(message, "span", &[], " More.").unwrap();
    assert_eq!(doc.text_content(message), "Great day! More.");
    assert!(doc.text_content(article).contains("Great day!"));
}

#[test]
fn test_set_text_content_replaces_children() {
    let (mut doc, _, message, _) = article_page();
    let span = doc.append_with_text(message, "span", &[], "child").unwrap();
    doc.set_text_content(message, "replaced").unwrap();
    assert_eq!(doc.text_content(message), "replaced");
    assert!(!doc.is_connected(span));
}

#[test]
fn test_remove_detaches_subtree() {
    let (mut doc, article, _, input) = article_page();
    assert!(doc.is_connected(input));
    doc.remove(article).unwrap();
    assert!(!doc.is_connected(input));
    assert!(doc.query_all(&Selector::attr("contenteditable")).is_empty());
}

#[test]
fn test_append_child_rejects_cycles() {
    let (mut doc, article, _, input) = article_page();
    let result = doc.append_child(input, article);
    assert_eq!(
        result,
        Err(DomError::HierarchyRequest {
            parent: input,
            child: article,
        })
    );
}

#[test]
fn test_unknown_node_errors() {
    let mut doc = Document::new("https://example.com/");
    let missing = NodeId(99);
    assert_eq!(doc.click(missing), Err(DomError::UnknownNode(missing)));
    assert_eq!(doc.dispatch_input(missing), Err(DomError::UnknownNode(missing)));
    assert!(doc.attribute(missing, "id").is_none());
    assert!(!doc.is_connected(missing));
}

#[test]
fn test_is_rendered_checks_ancestors() {
    let (mut doc, article, _, input) = article_page();
    assert!(doc.is_rendered(input));
    doc.set_attribute(article, "style", "display:none").unwrap();
    assert!(!doc.is_rendered(input));
    doc.remove_attribute(article, "style").unwrap();
    assert!(doc.is_rendered(input));
}

#[tokio::test]
async fn test_append_emits_mutation_only_when_connected() {
    let mut doc = Document::new("https://example.com/");
    let mut events = doc.subscribe();

    let detached = doc.create_element("div");
    let child = doc.create_element("span");
    doc.append_child(detached, child).unwrap();
    assert!(events.try_recv().is_err());

    doc.append_child(doc.body(), detached).unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        PageEvent::Mutation {
            added: vec![detached]
        }
    );
}

#[tokio::test]
async fn test_navigate_emits_once_per_change() {
    let mut doc = Document::new("https://example.com/a");
    let mut events = doc.subscribe();

    doc.navigate("https://example.com/a");
    assert!(events.try_recv().is_err());

    doc.navigate("https://example.com/b");
    assert_eq!(
        events.try_recv().unwrap(),
        PageEvent::Navigated {
            url: "https://example.com/b".to_string()
        }
    );
    assert_eq!(doc.url(), "https://example.com/b");
}

#[tokio::test]
async fn test_bound_click_is_intercepted() {
    let (mut doc, _, _, input) = article_page();
    let mut events = doc.subscribe();
    let control = doc.append(doc.body(), "div", &[]).unwrap();
    let _ = events.try_recv();

    doc.bind_activation(control, input).unwrap();
    doc.click(control).unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        PageEvent::ControlActivated {
            control,
            target: input
        }
    );
    assert!(doc.page_clicks().is_empty());
}

#[test]
fn test_unbound_click_reaches_page() {
    let (mut doc, article, _, _) = article_page();
    let like = doc.append(article, "div", &[("aria-label", "Like")]).unwrap();
    doc.click(like).unwrap();
    assert_eq!(doc.page_clicks(), &[like]);
}

#[test]
fn test_disabled_click_fails() {
    let (mut doc, article, _, _) = article_page();
    let like = doc
        .append(article, "div", &[("aria-label", "Like"), ("disabled", "")])
        .unwrap();
    assert_eq!(doc.click(like), Err(DomError::Disabled(like)));
    assert!(doc.page_clicks().is_empty());
}

#[test]
fn test_dropped_subscribers_are_pruned() {
    let mut doc = Document::new("https://example.com/");
    let events = doc.subscribe();
    drop(events);
    doc.navigate("https://example.com/next");
    assert!(doc.subscribers.is_empty());
}

#[test]
fn test_detached_nodes_reject_interaction() {
    let (mut doc, article, _, input) = article_page();
    doc.remove(article).unwrap();
    assert_eq!(doc.click(input), Err(DomError::Detached(input)));
    assert_eq!(doc.dispatch_input(input), Err(DomError::Detached(input)));
    assert!(doc.input_events().is_empty());
}
