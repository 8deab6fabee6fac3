mod support;

use inkwell::application::authors::AuthorError;
use inkwell::application::comments::CommentError;
use inkwell::application::groups::GroupError;
use inkwell::application::pagination::RequestedPage;
use inkwell::application::posts::PostError;
use inkwell::domain::error::DomainError;
use inkwell::domain::validation::{CommentDraft, GroupDraft, PostDraft};

use support::Harness;

fn draft(text: &str) -> PostDraft {
    PostDraft {
        text: text.to_string(),
        ..PostDraft::default()
    }
}

fn invalid_fields(err: &DomainError) -> Vec<&'static str> {
    match err {
        DomainError::Validation { errors } => errors.iter().map(|e| e.field).collect(),
        DomainError::NotFound { .. } => Vec::new(),
    }
}

#[tokio::test]
async fn create_post_requires_a_requester() {
    let h = Harness::new();
    let err = h
        .posts
        .create_post(None, draft("hello"))
        .await
        .expect_err("anonymous");
    assert!(matches!(err, PostError::Unauthenticated));
}

#[tokio::test]
async fn blank_text_and_unknown_group_fail_validation() {
    let h = Harness::new();
    let leo = h.author("leo").await;

    let blank = h
        .posts
        .create_post(Some(leo.id), draft("   "))
        .await
        .expect_err("blank");
    let PostError::Domain(err) = blank else {
        panic!("expected a validation error, got {blank:?}");
    };
    assert_eq!(invalid_fields(&err), vec!["text"]);

    let unknown = h
        .posts
        .create_post(
            Some(leo.id),
            PostDraft {
                text: "hello".to_string(),
                group: Some("nowhere".to_string()),
                image: None,
            },
        )
        .await
        .expect_err("unknown group");
    let PostError::Domain(err) = unknown else {
        panic!("expected a validation error, got {unknown:?}");
    };
    assert_eq!(invalid_fields(&err), vec!["group"]);
    assert_eq!(h.repos.post_count().await, 0);
}

#[tokio::test]
async fn post_text_is_trimmed_and_attributed() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    h.group("Cats", "cats").await;

    let post = h
        .posts
        .create_post(
            Some(leo.id),
            PostDraft {
                text: "  whiskers \n".to_string(),
                group: Some("cats".to_string()),
                image: Some("posts/cat.png".to_string()),
            },
        )
        .await
        .expect("create");

    assert_eq!(post.text, "whiskers");
    assert_eq!(post.author_username, "leo");
    assert_eq!(post.group.as_ref().map(|g| g.title.as_str()), Some("Cats"));
    assert_eq!(post.image.as_deref(), Some("posts/cat.png"));
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    let ann = h.author("ann").await;
    let post = h.post(&leo, "original", None).await;

    let err = h
        .posts
        .edit_post(Some(ann.id), post.id, draft("hijacked"))
        .await
        .expect_err("not the author");
    assert!(matches!(err, PostError::NotAuthor));

    let err = h
        .posts
        .delete_post(Some(ann.id), post.id)
        .await
        .expect_err("not the author");
    assert!(matches!(err, PostError::NotAuthor));

    let edited = h
        .posts
        .edit_post(Some(leo.id), post.id, draft("revised"))
        .await
        .expect("edit");
    assert_eq!(edited.text, "revised");
    assert_eq!(edited.author_id, leo.id);
    assert_eq!(edited.created_at, post.created_at);
}

#[tokio::test]
async fn editing_a_missing_post_is_not_found() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    let err = h
        .posts
        .edit_post(Some(leo.id), 404, draft("x"))
        .await
        .expect_err("missing");
    assert!(matches!(
        err,
        PostError::Domain(DomainError::NotFound { entity: "post" })
    ));
}

#[tokio::test]
async fn post_detail_lists_comments_oldest_first() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    let ann = h.author("ann").await;
    let post = h.post(&leo, "discuss", None).await;
    h.post(&leo, "another", None).await;

    for text in ["first!", "second"] {
        h.comments
            .add_comment(
                Some(ann.id),
                post.id,
                CommentDraft {
                    text: text.to_string(),
                },
            )
            .await
            .expect("comment");
    }

    let detail = h.posts.post_detail(post.id).await.expect("detail");
    let texts: Vec<&str> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first!", "second"]);
    assert_eq!(detail.comments[0].author_username, "ann");
    assert_eq!(detail.author_post_count, 2);
}

#[tokio::test]
async fn comments_need_a_requester_an_existing_post_and_text() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    let post = h.post(&leo, "discuss", None).await;
    let blank = CommentDraft {
        text: " ".to_string(),
    };

    assert!(matches!(
        h.comments.add_comment(None, post.id, blank.clone()).await,
        Err(CommentError::Unauthenticated)
    ));
    assert!(matches!(
        h.comments.add_comment(Some(leo.id), 999, blank.clone()).await,
        Err(CommentError::Domain(DomainError::NotFound { entity: "post" }))
    ));
    let err = h
        .comments
        .add_comment(Some(leo.id), post.id, blank)
        .await
        .expect_err("blank");
    let CommentError::Domain(err) = err else {
        panic!("expected validation");
    };
    assert_eq!(invalid_fields(&err), vec!["text"]);
    assert_eq!(h.repos.comment_count().await, 0);
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    let post = h.post(&leo, "short-lived", None).await;
    h.comments
        .add_comment(
            Some(leo.id),
            post.id,
            CommentDraft {
                text: "bye".to_string(),
            },
        )
        .await
        .expect("comment");

    h.posts.delete_post(Some(leo.id), post.id).await.expect("delete");
    assert_eq!(h.repos.post_count().await, 0);
    assert_eq!(h.repos.comment_count().await, 0);
}

#[tokio::test]
async fn group_slugs_are_derived_and_deduplicated() {
    let h = Harness::new();
    let draft = || GroupDraft {
        title: "Rust Tips".to_string(),
        slug: None,
        description: "  all about rust  ".to_string(),
    };

    let first = h.groups.create_group(draft()).await.expect("first");
    let second = h.groups.create_group(draft()).await.expect("second");

    assert_eq!(first.slug, "rust-tips");
    assert_ne!(second.slug, first.slug);
    assert!(second.slug.starts_with("rust-tips-"));
    assert_eq!(first.description, "all about rust");
}

#[tokio::test]
async fn explicit_slug_that_is_taken_fails_validation() {
    let h = Harness::new();
    h.group("Cats", "cats").await;

    let err = h
        .groups
        .create_group(GroupDraft {
            title: "More cats".to_string(),
            slug: Some("cats".to_string()),
            description: String::new(),
        })
        .await
        .expect_err("taken");
    let GroupError::Domain(err) = err else {
        panic!("expected validation");
    };
    assert_eq!(invalid_fields(&err), vec!["slug"]);
}

#[tokio::test]
async fn groups_list_alphabetically_and_deletion_keeps_posts() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    h.group("zebras", "zebras").await;
    h.group("Aardvarks", "aardvarks").await;
    let post = h.post(&leo, "stripes", Some("zebras")).await;

    let titles: Vec<String> = h
        .groups
        .list_groups()
        .await
        .expect("list")
        .into_iter()
        .map(|g| g.title)
        .collect();
    assert_eq!(titles, vec!["Aardvarks", "zebras"]);

    h.groups.delete_group("zebras").await.expect("delete");
    let detail = h.posts.post_detail(post.id).await.expect("post survives");
    assert!(detail.post.group.is_none());
    assert!(matches!(
        h.groups.find_group("zebras").await,
        Err(GroupError::Domain(DomainError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn usernames_are_validated_and_unique() {
    let h = Harness::new();
    h.author("leo").await;

    let taken = h.authors.register("leo").await.expect_err("taken");
    let AuthorError::Domain(err) = taken else {
        panic!("expected validation");
    };
    assert_eq!(invalid_fields(&err), vec!["username"]);

    let bad = h.authors.register("has space").await.expect_err("invalid");
    assert!(matches!(bad, AuthorError::Domain(DomainError::Validation { .. })));
}

#[tokio::test]
async fn deleting_an_author_removes_their_posts() {
    let h = Harness::new();
    let leo = h.author("leo").await;
    let ann = h.author("ann").await;
    h.post(&leo, "mine", None).await;
    h.post(&ann, "hers", None).await;

    h.authors.delete("leo").await.expect("delete");

    let page = h.feed.global_feed(RequestedPage::First).await.expect("feed");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].author_username, "ann");
    assert!(h.authors.find("leo").await.is_err());
}
