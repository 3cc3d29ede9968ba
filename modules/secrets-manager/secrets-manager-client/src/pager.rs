//! Offset-based pagination
//!
//! List endpoints return a page of items plus a `next` link whose query
//! string holds the offset of the following page. [`OffsetPager`] walks those
//! links:
//!
//! ```rust,ignore
//! let mut pager = client.secrets_pager(ListSecretsOptions { limit: Some(50), ..Default::default() });
//! while pager.has_next() {
//!     for secret in pager.get_next().await? {
//!         println!("{:?}", secret.name());
//!     }
//! }
//!
//! // or everything at once
//! let all = client.secrets_pager(ListSecretsOptions::default()).get_all().await?;
//! ```
//!
//! A failed `get_next()` leaves the pager untouched, so calling it again
//! repeats the same request.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use pin_project_lite::pin_project;
use secrets_manager_sdk::SecretsManagerError;
use secrets_manager_sdk::models::PageInfo;
use url::Url;

use crate::client::SecretsManagerClient;

/// Items of one page and its paging envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub info: PageInfo,
    pub items: Vec<T>,
}

/// Options of a paginated list operation.
pub trait PagedList: Clone + Send + Sync + 'static {
    type Item: Send + 'static;

    /// Offset the caller set, if any.
    fn offset(&self) -> Option<u32>;

    /// The same options addressing `offset`.
    #[must_use]
    fn at_offset(&self, offset: Option<u32>) -> Self;

    /// Fetch the page these options address.
    fn fetch(
        &self,
        client: &SecretsManagerClient,
    ) -> impl Future<Output = Result<Page<Self::Item>, SecretsManagerError>> + Send;
}

/// Offset of the page after `info`, read from the `offset` query parameter
/// of its `next` link. `None` when there is no such page.
///
/// # Errors
/// `Decode` when the link or its offset does not parse.
pub fn next_offset(info: &PageInfo) -> Result<Option<u32>, SecretsManagerError> {
    let Some(next) = info.next.as_ref() else {
        return Ok(None);
    };
    let invalid = |reason: String| SecretsManagerError::Decode {
        path: "$.next.href".to_owned(),
        reason,
    };
    let base = Url::parse("https://placeholder.invalid/").map_err(|e| invalid(e.to_string()))?;
    let href = Url::options()
        .base_url(Some(&base))
        .parse(&next.href)
        .map_err(|e| invalid(format!("'{}': {e}", next.href)))?;
    let Some((_, raw)) = href.query_pairs().find(|(key, _)| key == "offset") else {
        return Ok(None);
    };
    raw.parse::<u32>()
        .map(Some)
        .map_err(|e| invalid(format!("offset '{raw}': {e}")))
}

/// Lazy, restartable walk over a paginated list.
///
/// Single-caller: the API takes `&mut self`. The client is cloned in, so the
/// pager owns everything it needs.
pub struct OffsetPager<O: PagedList> {
    client: SecretsManagerClient,
    options: O,
    next_offset: Option<u32>,
    has_next: bool,
}

impl<O: PagedList> OffsetPager<O> {
    /// Start at the offset in `options`; when unset, the first request omits
    /// `offset`.
    #[must_use]
    pub fn new(client: SecretsManagerClient, options: O) -> Self {
        let next_offset = options.offset();
        Self {
            client,
            options,
            next_offset,
            has_next: true,
        }
    }

    /// Resume from an offset the caller tracked, such as the last one that
    /// succeeded before an error.
    #[must_use]
    pub fn with_start_offset(mut self, offset: u32) -> Self {
        self.next_offset = Some(offset);
        self.has_next = true;
        self
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Offset the next `get_next()` will request.
    #[must_use]
    pub fn next_offset(&self) -> Option<u32> {
        self.next_offset
    }

    /// Fetch the next page. After the last page this returns an empty list
    /// without a request.
    ///
    /// # Errors
    /// The error of the list operation; the pager state is left as it was.
    pub async fn get_next(&mut self) -> Result<Vec<O::Item>, SecretsManagerError> {
        if !self.has_next {
            return Ok(Vec::new());
        }
        let page = self
            .options
            .at_offset(self.next_offset)
            .fetch(&self.client)
            .await?;
        let next = next_offset(&page.info)?;
        tracing::trace!(
            offset = ?self.next_offset,
            items = page.items.len(),
            next = ?next,
            "fetched page"
        );
        self.has_next = next.is_some() && !page.items.is_empty();
        self.next_offset = next;
        Ok(page.items)
    }

    /// Every remaining item, in order.
    ///
    /// # Errors
    /// The first page error; items fetched before it are dropped.
    pub async fn get_all(&mut self) -> Result<Vec<O::Item>, SecretsManagerError> {
        let mut all = Vec::new();
        while self.has_next {
            all.extend(self.get_next().await?);
        }
        Ok(all)
    }

    /// The remaining items as a `Stream`. Iteration stops after the first
    /// error.
    pub fn into_stream(self) -> impl Stream<Item = Result<O::Item, SecretsManagerError>> + Send {
        let Self {
            client,
            options,
            next_offset,
            has_next,
        } = self;
        ItemStream::new(next_offset, has_next, move |offset| {
            let client = client.clone();
            let options = options.at_offset(offset);
            async move { options.fetch(&client).await }
        })
    }
}

pin_project! {
    /// `Stream` of items over a page-fetching function.
    pub struct ItemStream<T, F, Fut>
    where
        F: FnMut(Option<u32>) -> Fut,
        Fut: Future<Output = Result<Page<T>, SecretsManagerError>>,
    {
        next_offset: Option<u32>,
        buffer: VecDeque<T>,
        done: bool,
        fetcher: F,
        #[pin]
        current_fetch: Option<Fut>,
    }
}

impl<T, F, Fut> ItemStream<T, F, Fut>
where
    F: FnMut(Option<u32>) -> Fut,
    Fut: Future<Output = Result<Page<T>, SecretsManagerError>>,
{
    #[must_use]
    pub fn new(next_offset: Option<u32>, has_next: bool, fetcher: F) -> Self {
        Self {
            next_offset,
            buffer: VecDeque::new(),
            done: !has_next,
            fetcher,
            current_fetch: None,
        }
    }
}

impl<T, F, Fut> Stream for ItemStream<T, F, Fut>
where
    F: FnMut(Option<u32>) -> Fut,
    Fut: Future<Output = Result<Page<T>, SecretsManagerError>>,
{
    type Item = Result<T, SecretsManagerError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(item) = this.buffer.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if let Some(fut) = this.current_fetch.as_mut().as_pin_mut() {
                match fut.poll(cx) {
                    Poll::Ready(Ok(page)) => {
                        this.current_fetch.set(None);
                        match next_offset(&page.info) {
                            Ok(next) => {
                                *this.done = next.is_none() || page.items.is_empty();
                                *this.next_offset = next;
                            }
                            Err(e) => {
                                *this.done = true;
                                return Poll::Ready(Some(Err(e)));
                            }
                        }
                        this.buffer.extend(page.items);
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.current_fetch.set(None);
                        *this.done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            if *this.done {
                return Poll::Ready(None);
            }

            let fut = (this.fetcher)(*this.next_offset);
            this.current_fetch.set(Some(fut));
        }
    }
}
