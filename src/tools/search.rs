//! Web search backends for the native `web_search` tool

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// One search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// DuckDuckGo Instant Answer API client
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

/// Either a single topic or a named group of topics
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

fn flatten_topics(topics: Vec<RelatedTopic>, hits: &mut Vec<SearchHit>) {
    for topic in topics {
        match topic {
            RelatedTopic::Topic { text, first_url } => {
                let title = text
                    .split_once(" - ")
                    .map(|(title, _)| title.to_string())
                    .unwrap_or_else(|| text.clone());
                hits.push(SearchHit {
                    title,
                    href: first_url,
                    body: text,
                });
            }
            RelatedTopic::Group { topics } => flatten_topics(topics, hits),
        }
    }
}

impl InstantAnswer {
    fn into_hits(self, max_results: usize) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        if !self.abstract_text.is_empty() {
            hits.push(SearchHit {
                title: self.heading,
                href: self.abstract_url,
                body: self.abstract_text,
            });
        }
        flatten_topics(self.related_topics, &mut hits);
        hits.truncate(max_results);
        hits
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let url = format!("{}/", self.base_url);
        debug!(url = %url, query = %query, "Querying DuckDuckGo");

        let answer: InstantAnswer = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .context("search request failed")?
            .error_for_status()
            .context("search API returned an error status")?
            .json()
            .await
            .context("search API returned malformed JSON")?;

        Ok(answer.into_hits(max_results))
    }
}
