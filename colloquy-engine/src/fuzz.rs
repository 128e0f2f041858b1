#![cfg(test)]

use std::{panic::AssertUnwindSafe, sync::Arc};

use colloquy_api::{Comment, DocId, NewComment, Permission, Principal};
use colloquy_mock_repo::MockRepo;

use crate::*;

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            if std::env::var("RUST_LOG").is_ok() {
                let _ = tracing_subscriber::fmt().with_test_writer().try_init();
            }
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

const MAX_COMMENTS: usize = 24;

struct Forum {
    repo: Arc<MockRepo>,
    manager: CommentManager,
    doc: DocId,
    alice: Principal,
}

fn forum() -> Forum {
    let repo = Arc::new(MockRepo::new());
    let doc = repo.add_content("/domain/ws/doc", "Doc");
    repo.grant(doc, "alice", Permission::Read);
    let manager = CommentManager::new(repo.clone(), repo.clone(), repo.clone(), repo.clone());
    Forum {
        repo,
        manager,
        doc,
        alice: Principal::user("alice"),
    }
}

/// Each choice picks the parent of the next comment among the document and
/// the comments created so far
async fn grow(f: &Forum, choices: &[u8]) -> Vec<Comment> {
    let mut comments: Vec<Comment> = Vec::new();
    for (i, choice) in choices.iter().take(MAX_COMMENTS).enumerate() {
        let idx = *choice as usize % (comments.len() + 1);
        let parent = comments.get(idx);
        let parent_id = parent.map_or(f.doc, |p| p.id);
        let c = f
            .manager
            .create_comment(&f.alice, parent_id, NewComment::new(format!("comment {i}")))
            .await
            .expect("creating comment");
        let expected = match parent {
            None => Vec::new(),
            Some(p) => p.ancestor_ids.iter().copied().chain(Some(p.id)).collect(),
        };
        assert_eq!(c.ancestor_ids, expected);
        comments.push(c);
    }
    comments
}

async fn reply_trees_keep_ancestors_consistent(choices: Vec<u8>) {
    let f = forum();
    let comments = grow(&f, &choices).await;
    let resolver = AncestorResolver::new(&*f.repo, &*f.repo);
    for c in &comments {
        assert_eq!(
            &f.manager
                .get_comment(&f.alice, c.id)
                .await
                .expect("reading comment back"),
            c
        );
        assert_eq!(
            resolver
                .resolve_comment_root(&f.alice, c)
                .await
                .expect("resolving root"),
            f.doc
        );
        let top = f
            .manager
            .thread_for_comment(&f.alice, c.id)
            .await
            .expect("finding thread");
        assert_eq!(Some(&top.id), c.ancestor_ids.first().or(Some(&c.id)));
        assert_eq!(top.parent_id, f.doc);
    }
    let top_level = comments.iter().filter(|c| c.parent_id == f.doc).count();
    let listed = f
        .manager
        .list_comments(&f.alice, f.doc, None, 0, true)
        .await
        .expect("listing comments");
    assert_eq!(listed.total_count as usize, top_level);
}

do_tokio_test!(
    fuzz_reply_trees,
    Vec<u8>,
    reply_trees_keep_ancestors_consistent
);

async fn access_follows_root_permissions((read, full_control, choices): (bool, bool, Vec<u8>)) {
    let f = forum();
    let comments = grow(&f, &choices).await;
    let bob = Principal::user("bob");
    if read {
        f.repo.grant(f.doc, "bob", Permission::Read);
    }
    if full_control {
        f.repo.grant(f.doc, "bob", Permission::FullControl);
    }
    let can_read = read || full_control;
    for c in &comments {
        let res = f.manager.get_comment(&bob, c.id).await;
        assert_eq!(res.is_ok(), can_read, "reading {}: {res:?}", c.id);
        if let Err(e) = res {
            assert!(e.is_permission_denied(), "{e:?}");
        }
        let res = f
            .manager
            .create_comment(&bob, c.id, NewComment::new("reply"))
            .await;
        assert_eq!(res.is_ok(), can_read, "replying to {}: {res:?}", c.id);
    }
    if let Some(last) = comments.last() {
        let res = f.manager.delete_comment(&bob, last.id).await;
        assert_eq!(res.is_ok(), full_control, "deleting {}: {res:?}", last.id);
    }
}

do_tokio_test!(
    fuzz_root_permissions,
    (bool, bool, Vec<u8>),
    access_follows_root_permissions
);
