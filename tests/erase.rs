//! Erasing forum data.

mod common;

use async_trait::async_trait;
use common::{Fixture, Thread};
use forum_privacy::{
    ApprovedContextList, ApprovedUserList, Collaborators, FileArea, FileStore, PrivacyError,
    PrivacyProvider, StoredFile,
};

async fn count_rows(fx: &Fixture, table: &str, user_id: i64) -> i64 {
    fx.count(
        &format!("SELECT COUNT(*) FROM {} WHERE user_id = ?", table),
        &[user_id],
    )
    .await
}

#[tokio::test]
async fn test_purge_user_redacts_own_posts_in_place() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let before_p2 = fx.post_row(t.p2).await.unwrap();

    let approved = ApprovedContextList::new(t.a, [t.forum.context_id]);
    let mut tx = fx.db.begin().await.unwrap();
    let outcomes = fx
        .provider()
        .purge_user_data(&mut tx, &approved)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].posts_redacted, 2);
    assert_eq!(outcomes[0].user_ids, vec![t.a]);

    for (id, parent) in [(t.p1, None), (t.p3, Some(t.p2))] {
        let row = fx.post_row(id).await.unwrap();
        assert_eq!(row.id, id);
        assert_eq!(row.parent, parent);
        assert_eq!(row.user_id, t.a);
        assert_eq!(row.subject, "");
        assert_eq!(row.message, "");
        assert_eq!(row.message_format, 2);
        assert!(row.deleted);
    }

    assert_eq!(fx.post_row(t.p2).await.unwrap(), before_p2);
    assert_eq!(
        fx.count("SELECT COUNT(*) FROM forum_discussions", &[]).await,
        1
    );
}

#[tokio::test]
async fn test_purge_user_deletes_preference_rows() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let other = fx.forum("other").await;

    for user in [t.a, t.b] {
        fx.digest(t.forum, user, 1).await;
        fx.subscribe(t.forum, user).await;
        fx.track_pref(t.forum, user).await;
        fx.discussion_sub(t.forum, t.discussion, user, 1_700_000_000).await;
        fx.read(user, t.p1, 1, 2).await;
        fx.queue(user, t.discussion, t.p1).await;
    }
    fx.digest(other, t.a, 2).await;

    let approved = ApprovedContextList::new(t.a, [t.forum.context_id]);
    let mut tx = fx.db.begin().await.unwrap();
    let outcomes = fx
        .provider()
        .purge_user_data(&mut tx, &approved)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(outcomes[0].rows_deleted, 6);
    for table in [
        "forum_subscriptions",
        "forum_track_prefs",
        "forum_discussion_subs",
        "forum_read",
        "forum_queue",
    ] {
        assert_eq!(count_rows(&fx, table, t.a).await, 0, "{}", table);
        assert_eq!(count_rows(&fx, table, t.b).await, 1, "{}", table);
    }

    // The digest in the forum that was not approved survives.
    assert_eq!(count_rows(&fx, "forum_digests", t.a).await, 1);
    assert_eq!(count_rows(&fx, "forum_digests", t.b).await, 1);
}

#[tokio::test]
async fn test_purge_user_keeps_ratings_by_others() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let ctx = t.forum.context_id;
    fx.ratings.add(ctx, t.p1, t.a, 5).await;
    fx.ratings.add(ctx, t.p1, t.b, 3).await;
    fx.ratings.add(ctx, t.p2, t.a, 4).await;

    let approved = ApprovedContextList::new(t.a, [ctx]);
    let mut tx = fx.db.begin().await.unwrap();
    fx.provider()
        .purge_user_data(&mut tx, &approved)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let left: Vec<(i64, i64)> = fx
        .ratings
        .all()
        .await
        .iter()
        .map(|r| (r.post_id, r.user_id))
        .collect();
    assert_eq!(left, vec![(t.p1, t.b), (t.p2, t.a)]);
}

#[tokio::test]
async fn test_purge_user_deletes_tags_and_files_of_own_posts_only() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let ctx = t.forum.context_id;
    fx.tags.add(ctx, t.p1, "mine").await;
    fx.tags.add(ctx, t.p2, "theirs").await;
    fx.files
        .add(StoredFile::new(ctx, FileArea::Attachment, t.p3, "a.txt", vec![1]))
        .await;
    fx.files
        .add(StoredFile::new(ctx, FileArea::Post, t.p1, "b.png", vec![2]))
        .await;
    fx.files
        .add(StoredFile::new(ctx, FileArea::Attachment, t.p2, "c.txt", vec![3]))
        .await;

    let approved = ApprovedContextList::new(t.a, [ctx]);
    let mut tx = fx.db.begin().await.unwrap();
    fx.provider()
        .purge_user_data(&mut tx, &approved)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let tags: Vec<String> = fx.tags.all().await.into_iter().map(|t| t.name).collect();
    assert_eq!(tags, vec!["theirs".to_string()]);
    let files: Vec<String> = fx
        .files
        .all()
        .await
        .into_iter()
        .map(|f| f.filename)
        .collect();
    assert_eq!(files, vec!["c.txt".to_string()]);
}

#[tokio::test]
async fn test_purge_user_skips_non_forum_contexts() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let second = fx.forum("second").await;
    let d = fx.discussion(second, "more", t.a).await;
    fx.post(d, None, t.a, 10, "more").await;
    let course = fx.other_context("course", 1).await;

    let approved = ApprovedContextList::new(t.a, [t.forum.context_id, course, second.context_id]);
    let mut tx = fx.db.begin().await.unwrap();
    let outcomes = fx
        .provider()
        .purge_user_data(&mut tx, &approved)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let forums: Vec<i64> = outcomes.iter().map(|o| o.forum_id).collect();
    assert_eq!(forums, vec![t.forum.forum_id, second.forum_id]);
    assert_eq!(
        fx.count(
            "SELECT COUNT(*) FROM forum_posts WHERE user_id = ? AND deleted = 0",
            &[t.a]
        )
        .await,
        0
    );
}

#[tokio::test]
async fn test_purge_container_removes_everything() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let ctx = t.forum.context_id;
    let other = fx.forum("other").await;
    let d = fx.discussion(other, "keep", t.b).await;
    let kept = fx.post(d, None, t.b, 10, "keep").await;

    fx.digest(t.forum, t.a, 1).await;
    fx.subscribe(t.forum, t.b).await;
    fx.track_pref(t.forum, t.c).await;
    fx.discussion_sub(t.forum, t.discussion, t.c, -1).await;
    fx.queue(t.b, t.discussion, t.p3).await;
    fx.ratings.add(ctx, t.p1, t.b, 2).await;
    fx.ratings.add(other.context_id, kept, t.a, 4).await;
    fx.tags.add(ctx, t.p2, "gone").await;
    fx.files
        .add(StoredFile::new(ctx, FileArea::Post, t.p1, "a.png", vec![1]))
        .await;
    fx.files
        .add(StoredFile::new(ctx, FileArea::Intro, 0, "intro.png", vec![2]))
        .await;

    let mut tx = fx.db.begin().await.unwrap();
    let outcome = fx
        .provider()
        .purge_container(&mut tx, ctx)
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(outcome.forum_id, t.forum.forum_id);
    assert!(outcome.user_ids.is_empty());
    assert_eq!(outcome.posts_deleted, 3);
    assert_eq!(outcome.discussions_deleted, 1);

    let forum_id = t.forum.forum_id;
    assert_eq!(
        fx.count(
            "SELECT COUNT(*) FROM forum_posts p JOIN forum_discussions d ON d.id = p.discussion_id
             WHERE d.forum_id = ?",
            &[forum_id]
        )
        .await,
        0
    );
    assert_eq!(
        fx.count("SELECT COUNT(*) FROM forum_discussions WHERE forum_id = ?", &[forum_id])
            .await,
        0
    );
    for table in [
        "forum_digests",
        "forum_subscriptions",
        "forum_track_prefs",
        "forum_discussion_subs",
        "forum_read",
    ] {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE forum_id = ?", table);
        assert_eq!(fx.count(&sql, &[forum_id]).await, 0, "{}", table);
    }
    assert_eq!(fx.count("SELECT COUNT(*) FROM forum_queue", &[]).await, 0);

    let ratings = fx.ratings.all().await;
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].context_id, other.context_id);
    assert!(fx.tags.all().await.is_empty());
    let files = fx.files.all().await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].area, FileArea::Intro);

    assert!(fx.post_row(kept).await.is_some());
}

#[tokio::test]
async fn test_purge_container_ignores_other_context_kinds() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let course = fx.other_context("course", t.forum.forum_id).await;
    let missing_forum = fx.other_context("forum", 999).await;

    let mut tx = fx.db.begin().await.unwrap();
    let provider = fx.provider();
    assert!(provider.purge_container(&mut tx, course).await.unwrap().is_none());
    assert!(provider
        .purge_container(&mut tx, missing_forum)
        .await
        .unwrap()
        .is_none());
    assert!(provider.purge_container(&mut tx, 12345).await.unwrap().is_none());
    tx.commit().await.unwrap();

    assert_eq!(fx.count("SELECT COUNT(*) FROM forum_posts", &[]).await, 3);
}

#[tokio::test]
async fn test_purge_users_in_container() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let ctx = t.forum.context_id;
    fx.digest(t.forum, t.c, 1).await;
    fx.digest(t.forum, t.b, 1).await;
    fx.ratings.add(ctx, t.p1, t.a, 5).await;
    fx.ratings.add(ctx, t.p1, t.c, 1).await;

    let approved = ApprovedUserList::new(ctx, [t.a, t.c]);
    let mut tx = fx.db.begin().await.unwrap();
    let outcome = fx
        .provider()
        .purge_users_in_container(&mut tx, &approved)
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(outcome.posts_redacted, 2);
    assert_eq!(outcome.user_ids, vec![t.a, t.c]);

    assert!(fx.post_row(t.p1).await.unwrap().deleted);
    assert!(fx.post_row(t.p3).await.unwrap().deleted);
    assert!(!fx.post_row(t.p2).await.unwrap().deleted);

    assert_eq!(count_rows(&fx, "forum_read", t.c).await, 0);
    assert_eq!(count_rows(&fx, "forum_digests", t.c).await, 0);
    assert_eq!(count_rows(&fx, "forum_digests", t.b).await, 1);

    // A's self-rating goes; C's rating of A's post stays.
    let left: Vec<(i64, i64)> = fx
        .ratings
        .all()
        .await
        .iter()
        .map(|r| (r.post_id, r.user_id))
        .collect();
    assert_eq!(left, vec![(t.p1, t.c)]);
}

#[tokio::test]
async fn test_purge_users_in_container_with_large_user_list() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    let ctx = t.forum.context_id;
    fx.digest(t.forum, t.b, 1).await;

    let mut user_ids: Vec<i64> = (100_000..140_000).collect();
    user_ids.push(t.a);
    user_ids.push(t.c);
    let approved = ApprovedUserList::new(ctx, user_ids);

    let mut tx = fx.db.begin().await.unwrap();
    let outcome = fx
        .provider()
        .purge_users_in_container(&mut tx, &approved)
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(outcome.posts_redacted, 2);
    assert!(fx.post_row(t.p1).await.unwrap().deleted);
    assert!(fx.post_row(t.p3).await.unwrap().deleted);
    assert!(!fx.post_row(t.p2).await.unwrap().deleted);
    assert_eq!(count_rows(&fx, "forum_read", t.c).await, 0);
    assert_eq!(count_rows(&fx, "forum_digests", t.b).await, 1);
}

#[tokio::test]
async fn test_empty_approvals_are_noops() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;

    let mut tx = fx.db.begin().await.unwrap();
    let provider = fx.provider();
    let by_user = provider
        .purge_user_data(&mut tx, &ApprovedContextList::new(t.a, Vec::new()))
        .await
        .unwrap();
    let by_context = provider
        .purge_users_in_container(&mut tx, &ApprovedUserList::new(t.forum.context_id, Vec::new()))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert!(by_user.is_empty());
    assert!(by_context.is_none());
    assert_eq!(
        fx.count("SELECT COUNT(*) FROM forum_posts WHERE deleted = 1", &[])
            .await,
        0
    );
}

struct BrokenFileStore;

#[async_trait]
impl FileStore for BrokenFileStore {
    async fn area_files(
        &self,
        _context_id: i64,
        _area: FileArea,
        _item_id: Option<i64>,
    ) -> forum_privacy::Result<Vec<StoredFile>> {
        Ok(Vec::new())
    }

    async fn delete_area_files(
        &self,
        _context_id: i64,
        _area: FileArea,
        _item_ids: Option<&[i64]>,
    ) -> forum_privacy::Result<u64> {
        Err(PrivacyError::collaborator("files", "storage offline"))
    }
}

#[tokio::test]
async fn test_collaborator_failure_aborts_and_rolls_back() {
    let fx = Fixture::new().await;
    let t = Thread::create(&fx).await;
    fx.subscribe(t.forum, t.a).await;

    let broken = BrokenFileStore;
    let collab = Collaborators {
        files: &broken,
        ..fx.collaborators()
    };
    let provider = PrivacyProvider::new(collab);

    let approved = ApprovedContextList::new(t.a, [t.forum.context_id]);
    let mut tx = fx.db.begin().await.unwrap();
    let err = provider
        .purge_user_data(&mut tx, &approved)
        .await
        .unwrap_err();
    tx.rollback().await.unwrap();

    assert!(matches!(
        err,
        PrivacyError::Collaborator {
            component: "files",
            ..
        }
    ));
    assert_eq!(count_rows(&fx, "forum_subscriptions", t.a).await, 1);
    assert!(!fx.post_row(t.p1).await.unwrap().deleted);
}
