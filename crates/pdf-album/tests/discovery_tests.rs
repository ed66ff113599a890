mod common;

use common::*;
use pdf_album::*;

#[test]
fn test_discover_filters_unsupported_and_record() {
    let store = MemoryStore::new();
    store.add_file(&folder(), "b.png", Vec::new());
    store.add_file(&folder(), "notes.docx", Vec::new());
    store.add_file(&folder(), "a.h1.txt", b"Title".to_vec());
    store.add_file(&folder(), "scan.PDF", Vec::new());
    store.add_file(&folder(), ORDER_RECORD_NAME, br#"{"order": []}"#.to_vec());

    let units = discover_content(&store, &folder()).unwrap();

    assert_eq!(names(&units), ["a.h1.txt", "b.png", "scan.PDF"]);
    let kinds: Vec<ContentKind> = units.iter().map(|u| u.kind).collect();
    assert_eq!(kinds, [ContentKind::Text, ContentKind::Image, ContentKind::Pdf]);
    assert!(units.iter().all(|u| u.text_content.is_none()));
}

#[test]
fn test_discover_follows_saved_order() {
    let store = MemoryStore::new();
    let a = add_unit(&store, "a.jpg", Vec::new());
    let b = add_unit(&store, "b.jpg", Vec::new());
    let c = add_unit(&store, "c.jpg", Vec::new());
    persist_order(&store, &folder(), &[c, a, b]).unwrap();

    let units = discover_content(&store, &folder()).unwrap();
    assert_eq!(names(&units), ["c.jpg", "a.jpg", "b.jpg"]);
}

#[test]
fn test_new_file_surfaces_after_ordered_units() {
    let store = MemoryStore::new();
    let units = vec![
        add_unit(&store, "b.jpg", Vec::new()),
        add_unit(&store, "a.jpg", Vec::new()),
    ];
    persist_order(&store, &folder(), &units).unwrap();

    store.add_file(&folder(), "0_new.jpg", Vec::new());

    let units = discover_content(&store, &folder()).unwrap();
    assert_eq!(names(&units), ["b.jpg", "a.jpg", "0_new.jpg"]);
}

#[test]
fn test_deleted_file_drops_out_of_order() {
    let store = MemoryStore::new();
    let a = add_unit(&store, "a.jpg", Vec::new());
    store.add_file(
        &folder(),
        ORDER_RECORD_NAME,
        br#"{"order": ["gone.jpg", "a.jpg"]}"#.to_vec(),
    );

    let units = discover_content(&store, &folder()).unwrap();
    assert_eq!(units, vec![a]);
}

#[test]
fn test_discover_twice_is_stable() {
    let store = MemoryStore::new();
    for name in ["d.jpg", "B.jpg", "c.txt", "a.pdf"] {
        store.add_file(&folder(), name, Vec::new());
    }

    let first = discover_content(&store, &folder()).unwrap();
    persist_order(&store, &folder(), &first).unwrap();
    let second = discover_content(&store, &folder()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_corrupt_record_falls_back_to_sorted_listing() {
    let store = MemoryStore::new();
    store.add_file(&folder(), "b.jpg", Vec::new());
    store.add_file(&folder(), "a.jpg", Vec::new());
    store.add_file(&folder(), ORDER_RECORD_NAME, b"\x00garbage".to_vec());

    let units = discover_content(&store, &folder()).unwrap();
    assert_eq!(names(&units), ["a.jpg", "b.jpg"]);
}

#[test]
fn test_hydrate_text() {
    let store = MemoryStore::new();
    store.add_file(&folder(), "intro.h1.txt", "Chapter One".as_bytes().to_vec());
    store.add_file(&folder(), "photo.jpg", Vec::new());
    store.add_file(&folder(), "broken.txt", vec![0xff, 0xfe, 0xfd]);

    let options = DiscoverOptions { hydrate_text: true };
    let units = discover_content_with(&store, &folder(), &options).unwrap();

    let text_of = |name: &str| {
        units
            .iter()
            .find(|u| u.filename == name)
            .and_then(|u| u.text_content.clone())
    };
    assert_eq!(text_of("intro.h1.txt").as_deref(), Some("Chapter One"));
    assert_eq!(text_of("photo.jpg"), None);
    assert_eq!(text_of("broken.txt"), None);
}

#[test]
fn test_empty_folder() {
    let store = MemoryStore::new();
    assert!(discover_content(&store, &folder()).unwrap().is_empty());
}

#[test]
fn test_offline_store_is_remote_access_error() {
    let store = MemoryStore::new();
    store.add_file(&folder(), "a.jpg", Vec::new());
    store.set_offline(true);

    assert!(matches!(
        discover_content(&store, &folder()),
        Err(AlbumError::RemoteAccess(_))
    ));
}

#[test]
fn test_local_folder_store() {
    let dir = tempfile::tempdir().unwrap();
    let trip = dir.path().join("trip");
    std::fs::create_dir(&trip).unwrap();
    std::fs::write(trip.join("b.jpg"), b"").unwrap();
    std::fs::write(trip.join("a.txt"), b"hello").unwrap();
    std::fs::create_dir(trip.join("nested.pdf")).unwrap();

    let store = LocalFolderStore::new(dir.path());
    let handle = FolderHandle::from("trip");

    let units = discover_content(&store, &handle).unwrap();
    assert_eq!(names(&units), ["a.txt", "b.jpg"]);
    assert_eq!(units[0].id, FileId::from("trip/a.txt"));

    let reversed = vec![units[1].clone(), units[0].clone()];
    persist_order(&store, &handle, &reversed).unwrap();
    assert!(trip.join(ORDER_RECORD_NAME).is_file());

    let units = discover_content(&store, &handle).unwrap();
    assert_eq!(names(&units), ["b.jpg", "a.txt"]);
    assert_eq!(store.fetch(&units[1].id).unwrap(), b"hello");
}

#[test]
fn test_local_folder_store_missing_folder() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalFolderStore::new(dir.path());

    assert!(matches!(
        discover_content(&store, &FolderHandle::from("nope")),
        Err(AlbumError::RemoteAccess(RemoteError::NotFound(_)))
    ));
}
