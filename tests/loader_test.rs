use cattolingo::{LoadError, ModelLoader};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Stand-in for a loaded model; records which load produced it.
#[derive(Debug)]
struct CountedHandle {
    generation: usize,
}

#[tokio::test]
async fn test_loader_invoked_twice_loads_once() -> Result<(), LoadError> {
    let loader = ModelLoader::new();
    let loads = AtomicUsize::new(0);

    let first = loader
        .get_or_load(|| async {
            Ok::<_, LoadError>(CountedHandle { generation: loads.fetch_add(1, Ordering::SeqCst) })
        })
        .await?;
    let second = loader
        .get_or_load(|| async {
            Ok::<_, LoadError>(CountedHandle { generation: loads.fetch_add(1, Ordering::SeqCst) })
        })
        .await?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(second.generation, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_loads_once() {
    let loader = Arc::new(ModelLoader::<CountedHandle>::new());
    let loads = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];
    for _ in 0..8 {
        let loader = Arc::clone(&loader);
        let loads = Arc::clone(&loads);
        handles.push(tokio::spawn(async move {
            loader
                .get_or_load(|| async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let generation = loads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, LoadError>(CountedHandle { generation })
                })
                .await
                .unwrap()
        }));
    }

    let mut results = vec![];
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|h| Arc::ptr_eq(h, &results[0])));
}

#[test]
fn test_get_before_load_is_empty() {
    let loader: ModelLoader<CountedHandle> = ModelLoader::default();
    assert!(!loader.is_loaded());
    assert!(loader.get().is_none());

    let handle = tokio_test::block_on(loader.get_or_load(|| async {
        Ok::<_, LoadError>(CountedHandle { generation: 3 })
    }))
    .unwrap();
    assert_eq!(handle.generation, 3);
    assert!(Arc::ptr_eq(&handle, &loader.get().unwrap()));
}
