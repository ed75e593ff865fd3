use url::Url;

use crate::app::{AppContext, ReadLaterError, Result, SubmitError};

pub async fn login(ctx: &AppContext, username: &str, password: &str) -> Result<()> {
    ctx.client.authenticate(username, password).await?;
    println!("Signed in as {}", username.trim());
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.client.sign_out().await?;
    println!("Signed out");
    Ok(())
}

pub async fn status(ctx: &AppContext) -> Result<()> {
    match ctx.client.username().await {
        Some(username) => println!("Signed in as {}", username),
        None => println!("Not signed in"),
    }

    let pending = ctx.client.pending().await?;
    println!("{} pending", pending.len());
    Ok(())
}

pub async fn save(ctx: &AppContext, url: &str, title: &str, selection: &str) -> Result<()> {
    let url = Url::parse(url)?;
    report_submission(ctx.client.submit(&url, title, selection).await, &url)
}

pub async fn list_articles(ctx: &AppContext, feed: Option<&str>) -> Result<()> {
    let articles = ctx.load_articles(feed).await?;

    if articles.is_empty() {
        println!("No articles");
        return Ok(());
    }

    for (index, article) in articles.iter().enumerate() {
        let link = article.url.as_ref().map(Url::as_str).unwrap_or("(no link)");
        println!("{:>3}. {}\n     {}", index + 1, article.display_title(), link);
    }

    Ok(())
}

pub async fn pick(ctx: &AppContext, index: usize, feed: Option<&str>, selection: &str) -> Result<()> {
    let articles = ctx.load_articles(feed).await?;

    let article = index
        .checked_sub(1)
        .and_then(|i| articles.get(i))
        .ok_or_else(|| {
            ReadLaterError::Other(format!("No article {} (feed has {})", index, articles.len()))
        })?;
    let url = article
        .url
        .clone()
        .ok_or_else(|| ReadLaterError::Other(format!("\"{}\" has no link", article.display_title())))?;

    report_submission(ctx.client.submit(&url, &article.title, selection).await, &url)
}

pub async fn list_pending(ctx: &AppContext) -> Result<()> {
    let pending = ctx.client.pending().await?;

    if pending.is_empty() {
        println!("Nothing pending");
        return Ok(());
    }

    for item in pending {
        if item.title.is_empty() {
            println!("{}", item.url);
        } else {
            println!("{}\n  {}", item.title, item.url);
        }
    }

    Ok(())
}

pub async fn retry(ctx: &AppContext) -> Result<()> {
    let remaining = ctx.client.retry_pending().await?;
    println!("{} still pending", remaining);
    Ok(())
}

pub async fn clear(ctx: &AppContext) -> Result<()> {
    ctx.client.clear_pending().await?;
    println!("Pending bookmarks cleared");
    Ok(())
}

// Offline is not a failure from the user's point of view as long as the
// bookmark made it into the queue.
fn report_submission(result: std::result::Result<(), SubmitError>, url: &Url) -> Result<()> {
    match result {
        Ok(()) => {
            println!("Saved {}", url);
            Ok(())
        }
        Err(SubmitError::ConnectionFailed { queued: true }) => {
            println!("Offline, saved {} for later", url);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
