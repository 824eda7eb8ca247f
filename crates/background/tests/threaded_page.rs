use background::{SessionManager, SessionState};
use bus::{Cardinality, OccurrenceQuery, PopupRequest, PopupResponse, UnreachableReason};
use content::Page;
use core_types::SearchOptions;
use runtime_page::PageHandle;

const URL: &str = "https://example.com/article";

fn update(regex: &str) -> PopupRequest {
    PopupRequest::Update {
        regex: regex.to_string(),
        options: SearchOptions::default(),
    }
}

#[test]
fn session_drives_a_page_on_its_own_thread() {
    let html = "<h1>Rust</h1><p>Rust is a language. <em>Rust</em> is fast.</p>";
    let mut manager = SessionManager::new();
    manager
        .open(1, PageHandle::spawn(Page::parse(html, None)), URL)
        .unwrap();

    assert_eq!(
        manager.handle(1, update("Rust")),
        PopupResponse::IndexUpdate { index: 1, total: 3 }
    );
    assert_eq!(
        manager.handle(
            1,
            PopupRequest::Previous {
                options: SearchOptions::default()
            }
        ),
        PopupResponse::IndexUpdate { index: 3, total: 3 }
    );
    assert_eq!(
        manager.handle(
            1,
            PopupRequest::GetOccurrence {
                options: OccurrenceQuery {
                    cardinality: Cardinality::Single
                }
            }
        ),
        PopupResponse::GetOccurrence {
            response: "Rust".to_string()
        }
    );
    assert_eq!(manager.get(1).unwrap().state(), SessionState::Searching);

    let page = manager.close(1).and_then(PageHandle::into_page).unwrap();
    assert_eq!(page.html(), html);
}

#[test]
fn closed_page_thread_is_unreachable() {
    let mut handle = PageHandle::spawn(Page::parse("<p>x</p>", None));
    handle.close();

    let mut manager = SessionManager::new();
    let err = manager.open(1, handle, "file:///home/me/notes.html").unwrap_err();
    assert_eq!(
        err.response(),
        PopupResponse::Unreachable {
            reason: UnreachableReason::OfflineFile
        }
    );
    assert!(manager.is_empty());
}
