mod common;

use common::*;
use pdf_album::*;

#[test]
fn test_create_text_unit_uploads_and_hydrates() {
    let store = MemoryStore::new();

    let unit = create_text_unit(&store, &folder(), "intro.h1.txt", "Chapter One").unwrap();

    assert_eq!(unit.kind, ContentKind::Text);
    assert_eq!(unit.text_content.as_deref(), Some("Chapter One"));
    assert_eq!(store.file_bytes(&unit.id).unwrap(), b"Chapter One");
}

#[test]
fn test_create_text_unit_requires_txt() {
    let store = MemoryStore::new();

    for name in ["intro.md", "intro", ".txt"] {
        assert!(
            matches!(
                create_text_unit(&store, &folder(), name, "x"),
                Err(AlbumError::Config(_))
            ),
            "{} should be rejected",
            name
        );
    }
    assert!(create_text_unit(&store, &folder(), "LOUD.TXT", "x").is_ok());
    assert_eq!(store.file_names(&folder()), ["LOUD.TXT"]);
}

#[test]
fn test_insert_text_after_selection_and_persist() {
    let store = MemoryStore::new();
    let mut story = vec![
        add_unit(&store, "a.jpg", Vec::new()),
        add_unit(&store, "b.jpg", Vec::new()),
    ];
    persist_order(&store, &folder(), &story).unwrap();

    let text = create_text_unit(&store, &folder(), "caption.p.txt", "Sunset").unwrap();
    insert_unit(&mut story, Some(1), text);
    persist_order(&store, &folder(), &story).unwrap();

    let reloaded = discover_content(&store, &folder()).unwrap();
    assert_eq!(names(&reloaded), ["a.jpg", "caption.p.txt", "b.jpg"]);
}

#[test]
fn test_cut_paste_and_persist() {
    let store = MemoryStore::new();
    let mut story: Vec<ContentUnit> = ["a.jpg", "b.jpg", "c.jpg", "d.jpg"]
        .iter()
        .map(|n| add_unit(&store, n, Vec::new()))
        .collect();

    let clipboard = remove_units(&mut story, &[2, 3]);
    paste_units(&mut story, clipboard, None);
    persist_order(&store, &folder(), &story).unwrap();

    let reloaded = discover_content(&store, &folder()).unwrap();
    assert_eq!(names(&reloaded), ["c.jpg", "d.jpg", "a.jpg", "b.jpg"]);
}

#[test]
fn test_quick_sort_session() {
    let store = MemoryStore::new();
    let all: Vec<ContentUnit> = ["img_3.jpg", "IMG_1.jpg", "img_2.jpg", "title.h1.txt"]
        .iter()
        .map(|n| add_unit(&store, n, Vec::new()))
        .collect();

    let mut story: Vec<ContentUnit> = Vec::new();
    let mut unsorted = unsorted_units(&all, &story);
    assert_eq!(
        names(&unsorted),
        ["IMG_1.jpg", "img_2.jpg", "img_3.jpg", "title.h1.txt"]
    );

    // Pick the title, then the last photo
    story.push(unsorted.remove(3));
    story.push(unsorted.remove(2));
    assert_eq!(names(&unsorted_units(&all, &story)), names(&unsorted));

    finish_quick_sort(&mut story, unsorted);
    persist_order(&store, &folder(), &story).unwrap();

    let reloaded = discover_content(&store, &folder()).unwrap();
    assert_eq!(
        names(&reloaded),
        ["title.h1.txt", "img_3.jpg", "IMG_1.jpg", "img_2.jpg"]
    );
}

#[test]
fn test_delete_and_invalidate_cache() {
    let store = MemoryStore::new();
    let mut story = vec![
        add_unit(&store, "a.pdf", create_test_pdf(1)),
        add_unit(&store, "b.pdf", create_test_pdf(1)),
    ];
    let mut cache = PageCache::new();
    assert!(cache.is_empty());
    assemble_albums_cached(&store, &story, &AlbumSettings::default(), &mut cache, |_, _| {})
        .unwrap();
    assert_eq!(cache.len(), 2);

    let removed = remove_units(&mut story, &[0]);
    assert_eq!(cache.invalidate_units(&removed), 1);
    assert_eq!(cache.len(), 1);
    assert!(!cache.invalidate(&removed[0].id));
    assert_eq!(cache.invalidate_units(&story), 1);
    assert!(cache.is_empty());

    assert_eq!(names(&story), ["b.pdf"]);
}
