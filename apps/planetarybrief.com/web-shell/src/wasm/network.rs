use super::*;

    pub(super) async fn fetch_articles(endpoint: &str) -> Result<Vec<Article>, ShellError> {
        let response = Request::get(endpoint)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(map_network_error)?;
        if !response.ok() {
            return Err(ShellError::ArticleStatus {
                status: response.status(),
            });
        }
        let body = response.text().await.map_err(map_network_error)?;
        decode_article_feed(&body)
    }

    /// Fetches the index once and feeds the result to the navigator. A failure
    /// keeps whatever the navigator holds and leaves any deep link pending.
    pub(super) async fn load_article_index(endpoint: &str) {
        match fetch_articles(endpoint).await {
            Ok(articles) => {
                let count = articles.len();
                if with_navigator(|navigator, env| navigator.articles_loaded(env, articles)).is_ok() {
                    set_boot_phase("ready", &format!("{count} articles loaded"));
                    publish_view_change();
                }
            }
            Err(error) => {
                let reason = error.to_string();
                let _ = with_navigator(|navigator, _env| navigator.articles_failed(&reason));
                console_warn(&format!("article index unavailable: {reason}"));
                DIAGNOSTICS.with(|state| state.borrow_mut().last_error = Some(reason));
            }
        }
    }

    pub(super) fn map_network_error(error: gloo_net::Error) -> ShellError {
        ShellError::ArticleFetch {
            reason: error.to_string(),
        }
    }
