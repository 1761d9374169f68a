//! Pull-based handle over a streamed completion.

use std::fmt;

use conduit_core::{AdapterError, Context, Operation, ProviderError};
use futures::stream::{self, BoxStream, Stream, StreamExt};

/// Raw fragment source a binding hands to [`CompletionStream`].
pub type FragmentStream = BoxStream<'static, Result<String, ProviderError>>;

type CloseHook = Box<dyn FnOnce() + Send>;

/// A finite, forward-only sequence of completion fragments.
///
/// Each [`next`](Self::next) suspends until the provider pushes the next
/// fragment, the stream ends, or the context it was opened with is done.
/// The underlying source is released on end of stream, on the first error,
/// on [`close`](Self::close), and on drop, whichever comes first; the close
/// hook runs exactly once at that point.
pub struct CompletionStream {
    provider: String,
    ctx: Context,
    inner: Option<FragmentStream>,
    on_close: Option<CloseHook>,
}

impl CompletionStream {
    pub fn new(provider: impl Into<String>, ctx: Context, inner: FragmentStream) -> Self {
        Self {
            provider: provider.into(),
            ctx,
            inner: Some(inner),
            on_close: None,
        }
    }

    /// A stream yielding the given fragments in order.
    pub fn from_fragments<I, S>(provider: impl Into<String>, ctx: Context, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<Result<String, ProviderError>> =
            fragments.into_iter().map(|f| Ok(f.into())).collect();
        Self::new(provider, ctx, stream::iter(items).boxed())
    }

    /// A stream that ends immediately.
    pub fn empty(provider: impl Into<String>, ctx: Context) -> Self {
        Self::new(provider, ctx, stream::empty().boxed())
    }

    /// Registers a hook to run when the underlying source is released.
    #[must_use]
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns `true` once the source has been released.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Pulls the next fragment.
    ///
    /// Returns `None` at end of stream and on every call after the stream
    /// ended, failed, or was closed.
    pub async fn next(&mut self) -> Option<Result<String, AdapterError>> {
        let inner = self.inner.as_mut()?;

        let item = tokio::select! {
            biased;
            err = self.ctx.done() => Some(Err(err)),
            item = inner.next() => item,
        };

        match item {
            Some(Ok(fragment)) => Some(Ok(fragment)),
            Some(Err(err)) => {
                self.release();
                tracing::debug!(
                    provider = %self.provider,
                    error = %err,
                    "completion stream failed"
                );
                Some(Err(AdapterError::new(
                    self.provider.clone(),
                    Operation::StreamComplete,
                    err,
                )))
            }
            None => {
                self.release();
                None
            }
        }
    }

    /// Releases the underlying source without reading the rest.
    pub fn close(&mut self) {
        self.release();
    }

    /// Reads the remaining fragments and joins them.
    pub async fn collect_text(mut self) -> Result<String, AdapterError> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    /// Adapts the handle into a [`Stream`] of fragments.
    pub fn into_stream(self) -> impl Stream<Item = Result<String, AdapterError>> + Send {
        stream::unfold(self, |mut s| async move { s.next().await.map(|item| (item, s)) })
    }

    fn release(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!(provider = %self.provider, "completion stream released");
        }
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

impl Drop for CompletionStream {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for CompletionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionStream")
            .field("provider", &self.provider)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook_count = Arc::clone(&count);
        (count, move || {
            hook_count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn yields_fragments_in_order_then_ends() {
        let mut s =
            CompletionStream::from_fragments("test", Context::background(), ["Hel", "lo", "!"]);
        assert_eq!(s.next().await.unwrap().unwrap(), "Hel");
        assert_eq!(s.next().await.unwrap().unwrap(), "lo");
        assert_eq!(s.next().await.unwrap().unwrap(), "!");
        assert!(s.next().await.is_none());
        assert!(s.next().await.is_none());
        assert!(s.is_closed());
    }

    #[tokio::test]
    async fn collect_text_joins_fragments() {
        let s = CompletionStream::from_fragments("test", Context::background(), ["a", "b", "c"]);
        assert_eq!(s.collect_text().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn empty_stream_ends_immediately() {
        let mut s = CompletionStream::empty("test", Context::background());
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn mid_stream_error_surfaces_then_stream_ends() {
        let items: Vec<Result<String, ProviderError>> = vec![
            Ok("partial".into()),
            Err(ProviderError::Unavailable("connection reset".into())),
            Ok("never seen".into()),
        ];
        let mut s =
            CompletionStream::new("openai", Context::background(), stream::iter(items).boxed());

        assert_eq!(s.next().await.unwrap().unwrap(), "partial");
        let err = s.next().await.unwrap().unwrap_err();
        assert_eq!(err.provider(), "openai");
        assert_eq!(err.op(), Operation::StreamComplete);
        assert!(err.is(conduit_core::ErrorKind::ProviderUnavailable));
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn close_hook_runs_once_on_end() {
        let (count, hook) = counter();
        let mut s =
            CompletionStream::from_fragments("test", Context::background(), ["x"]).on_close(hook);
        while s.next().await.is_some() {}
        drop(s);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn early_close_releases_source() {
        let (count, hook) = counter();
        let mut s = CompletionStream::from_fragments("test", Context::background(), ["a", "b", "c"])
            .on_close(hook);
        assert_eq!(s.next().await.unwrap().unwrap(), "a");
        s.close();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(s.next().await.is_none());
        s.close();
        drop(s);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drop_releases_source() {
        let (count, hook) = counter();
        let s =
            CompletionStream::from_fragments("test", Context::background(), ["a"]).on_close(hook);
        drop(s);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_fails_pending_read() {
        let (count, hook) = counter();
        let ctx = Context::background();
        let source = stream::iter(vec![Ok("first".to_string())]).chain(stream::pending());
        let mut s = CompletionStream::new("test", ctx.clone(), source.boxed()).on_close(hook);

        assert_eq!(s.next().await.unwrap().unwrap(), "first");

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = tokio::time::timeout(Duration::from_secs(2), s.next())
            .await
            .expect("cancellation should wake the read")
            .unwrap()
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn deadline_expiry_is_timeout() {
        let ctx = Context::with_timeout(Duration::from_millis(10));
        let mut s = CompletionStream::new("test", ctx, stream::pending().boxed());
        let err = s.next().await.unwrap().unwrap_err();
        assert!(err.is(conduit_core::ErrorKind::Timeout));
    }

    #[tokio::test]
    async fn into_stream_yields_same_fragments() {
        let s = CompletionStream::from_fragments("test", Context::background(), ["a", "b"]);
        let items: Vec<String> = s
            .into_stream()
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(items, vec!["a", "b"]);
    }
}
