//! Sharing one asynchronous set-trie between tasks
use std::sync::Arc;

use futures::TryStreamExt;
use set_trie::AsyncSetTrieMap;

#[tokio::main]
async fn main() -> set_trie::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).init();

    // Permissions required by each route
    let routes = Arc::new(AsyncSetTrieMap::<&'static str, &'static str>::new());

    let writers: Vec<_> = [
        (vec!["read"], "/docs"),
        (vec!["read", "write"], "/edit"),
        (vec!["admin", "read", "write"], "/settings"),
    ]
    .into_iter()
    .map(|(permissions, route)| {
        let routes = Arc::clone(&routes);
        tokio::spawn(async move { routes.insert(permissions, route).await })
    })
    .collect();
    for writer in writers {
        writer.await.expect("writer task panicked")?;
    }

    // Routes a user holding these permissions can reach
    let mut reachable: Vec<_> = routes.subsets(vec!["write", "read"])?.try_collect().await?;
    reachable.sort_unstable();
    println!("reachable: {:?}", reachable);

    // Routes that need write access
    let mut writing: Vec<_> = routes.supersets(vec!["write"])?.try_collect().await?;
    writing.sort_unstable();
    println!("need write: {:?}", writing);

    let retired = routes.take(vec!["read"]).await?;
    println!("retired: {:?}", retired);

    Ok(())
}
