use std::{pin::Pin, sync::Arc, time::SystemTime};

use forecast_client::domain::TableKind;
use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub created_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            created_at: SystemTime::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("{table} record rejected: {reason}")]
    Rejected { table: TableKind, reason: String },
    #[error("sink error: {0}")]
    Sink(String),
    #[error("store unavailable: {0}")]
    Connection(String),
    #[error("schema error: {0}")]
    Schema(String),
}

pub type RecordStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> RecordStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    /// Summary handed back once the stream is drained.
    type Report: Send;

    async fn run<S>(&self, input: S) -> Result<Self::Report, PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

pub struct Pipeline<S, T, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<T, T> + Send + Sync>>, // same-type transforms chain
    pub sink: K,
}

impl<T, S, K> Pipeline<S, T, K>
where
    T: Send + 'static,
    S: Source<T> + Send + Sync + 'static,
    K: Sink<T> + Send + Sync + 'static,
{
    pub async fn run(self) -> Result<K::Report, PipelineError> {
        let mut stream = self.source.stream().await;

        for t in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let t = t.clone();
                async move {
                    match item {
                        Ok(env) => t.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        self.sink.run(stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::Mutex;

    struct Numbers(Vec<i64>);

    #[async_trait::async_trait]
    impl Source<i64> for Numbers {
        async fn stream(&self) -> RecordStream<i64> {
            Box::pin(stream::iter(self.0.clone().into_iter().map(|n| Ok(Envelope::new(n)))))
        }
    }

    struct RejectNegative;

    #[async_trait::async_trait]
    impl Transform<i64, i64> for RejectNegative {
        async fn apply(&self, input: Envelope<i64>) -> Result<Envelope<i64>, PipelineError> {
            if input.payload < 0 {
                return Err(PipelineError::Transform("negative".to_string()));
            }
            Ok(input)
        }
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<i64>>);

    #[async_trait::async_trait]
    impl Sink<i64> for Collect {
        type Report = usize;

        async fn run<S>(&self, mut input: S) -> Result<usize, PipelineError>
        where
            S: Stream<Item = Result<Envelope<i64>, PipelineError>> + Send + Unpin + 'static,
        {
            let mut rejected = 0;
            while let Some(item) = input.next().await {
                match item {
                    Ok(env) => {
                        self.0.lock().unwrap().push(env.payload);
                    }
                    Err(_) => rejected += 1,
                }
            }
            Ok(rejected)
        }
    }

    #[tokio::test]
    async fn transform_errors_reach_the_sink_without_stopping_the_stream() {
        let pipeline: Pipeline<_, i64, _> = Pipeline {
            source: Numbers(vec![1, -2, 3, -4, 5]),
            transforms: vec![Arc::new(RejectNegative)],
            sink: Collect::default(),
        };
        let rejected = pipeline.run().await.unwrap();
        assert_eq!(rejected, 2);
    }
}
