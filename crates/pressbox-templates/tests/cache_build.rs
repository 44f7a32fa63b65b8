//! Template cache build and render integration tests.

use pressbox_templates::{PageInventory, RenderEnvelope, TemplateCache, TemplateError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE: &str = r#"<!doctype html>
<title>{% block title %}{% endblock %} - Pressbox</title>
{% include "partials/nav.html" %}
<main>
{% if flash %}<div class="flash">{{ flash }}</div>{% endif %}
{% block main %}{% endblock %}
</main>
<footer>Powered by Pressbox in {{ current_year }}</footer>"#;

const NAV: &str = r#"<nav><a href="/">Home</a>{% if is_authenticated %} <a href="/item/create">Create</a>{% endif %}</nav>"#;

const HOME: &str = r#"{% extends "base.html" %}
{% block title %}Home{% endblock %}
{% block main %}{% for item in items %}<tr><td>{{ item.title }}</td><td>{{ item.created | human_date }}</td></tr>{% endfor %}{% endblock %}"#;

const VIEW: &str = r#"{% extends "base.html" %}
{% block title %}Item #{{ item.id }}{% endblock %}
{% block main %}<h1>{{ item.title }}</h1><pre>{{ item.content }}</pre>{% endblock %}"#;

#[derive(Serialize)]
struct Item {
    id: i64,
    title: String,
    content: String,
    created: String,
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn site() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.html", BASE);
    write(dir.path(), "partials/nav.html", NAV);
    write(dir.path(), "pages/home.html", HOME);
    write(dir.path(), "pages/view.html", VIEW);
    dir
}

fn item() -> Item {
    Item {
        id: 3,
        title: "An old silent pond".into(),
        content: "A frog jumps into the pond <splash>".into(),
        created: "2024-01-02T15:04:05Z".into(),
    }
}

#[test]
fn test_build_is_idempotent() {
    let dir = site();
    let inventory = PageInventory::from_dir(dir.path()).unwrap();

    let first = TemplateCache::build(&inventory).unwrap();
    let second = TemplateCache::build(&inventory).unwrap();

    assert_eq!(first.page_names(), vec!["home.html", "view.html"]);
    assert_eq!(first.page_names(), second.page_names());

    let envelope = RenderEnvelope::new(2024)
        .with_payload("items", &vec![item()])
        .unwrap();
    assert_eq!(
        first.render("home.html", &envelope).unwrap(),
        second.render("home.html", &envelope).unwrap()
    );
}

#[test]
fn test_render_fills_layout_partials_and_page() {
    let dir = site();
    let cache = TemplateCache::build(&PageInventory::from_dir(dir.path()).unwrap()).unwrap();

    let envelope = RenderEnvelope::new(2024)
        .with_flash(Some("Item successfully created!".into()))
        .with_authenticated(true)
        .with_payload("item", &item())
        .unwrap();
    let body = cache.render("view.html", &envelope).unwrap();
    let html = std::str::from_utf8(&body).unwrap();

    assert!(html.contains("<title>Item #3 - Pressbox</title>"));
    assert!(html.contains(r#"<a href="/item/create">Create</a>"#));
    assert!(html.contains("Item successfully created!"));
    assert!(html.contains("&lt;splash&gt;"));
    assert!(html.contains("Powered by Pressbox in 2024"));
}

#[test]
fn test_human_date_in_page() {
    let dir = site();
    let cache = TemplateCache::build(&PageInventory::from_dir(dir.path()).unwrap()).unwrap();
    let envelope = RenderEnvelope::new(2024)
        .with_payload("items", &vec![item()])
        .unwrap();

    let body = cache.render("home.html", &envelope).unwrap();
    let html = std::str::from_utf8(&body).unwrap();
    assert!(html.contains("<td>02 Jan 2024 at 15:04</td>"));
}

#[test]
fn test_duplicate_page_names_fail_the_build() {
    let dir = site();
    let other = TempDir::new().unwrap();
    write(other.path(), "home.html", HOME);

    let inventory = PageInventory::from_dir(dir.path())
        .unwrap()
        .with_pages_dir(other.path())
        .unwrap();

    match TemplateCache::build(&inventory) {
        Err(TemplateError::DuplicatePage { name, .. }) => assert_eq!(name, "home.html"),
        other => panic!("expected duplicate page error, got {other:?}"),
    }
}

#[test]
fn test_missing_base_fails_the_build() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "partials/nav.html", NAV);
    write(dir.path(), "pages/home.html", HOME);

    let inventory = PageInventory::from_dir(dir.path()).unwrap();
    let result = TemplateCache::build(&inventory);

    assert!(matches!(result, Err(TemplateError::Inventory(_))));
}

#[test]
fn test_syntax_error_fails_the_build() {
    let dir = site();
    write(
        dir.path(),
        "pages/broken.html",
        r#"{% extends "base.html" %}{% block main %}{% if %}{% endblock %}"#,
    );

    let result = TemplateCache::build(&PageInventory::from_dir(dir.path()).unwrap());
    match result {
        Err(error @ TemplateError::Parse { .. }) => assert!(error.to_string().contains("broken.html")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_unknown_parent_fails_the_build() {
    let dir = site();
    write(
        dir.path(),
        "pages/orphan.html",
        r#"{% extends "layout.html" %}{% block main %}x{% endblock %}"#,
    );

    let result = TemplateCache::build(&PageInventory::from_dir(dir.path()).unwrap());
    assert!(matches!(result, Err(TemplateError::Parse { .. })));
}

#[test]
fn test_render_error_yields_no_body() {
    let dir = site();
    let cache = TemplateCache::build(&PageInventory::from_dir(dir.path()).unwrap()).unwrap();

    // `item` is required by view.html.
    let result = cache.render("view.html", &RenderEnvelope::new(2024));
    assert!(matches!(result, Err(TemplateError::Render { .. })));
}
