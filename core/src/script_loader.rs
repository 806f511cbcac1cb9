// paydesk/src/script_loader.rs

//! Idempotent loading of the hosted widget's script.

use crate::domain::WidgetScript;
use crate::ports::ScriptSource;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load widget script from {url}: {reason}")]
pub struct ScriptLoadError {
  pub url: String,
  pub reason: String,
}

type SharedLoad = Shared<BoxFuture<'static, Result<(), String>>>;

enum Slot {
  Loading { generation: u64, load: SharedLoad },
  Loaded,
}

#[derive(Default)]
struct Slots {
  by_id: HashMap<String, Slot>,
  next_generation: u64,
}

/// Loads each script id at most once.
///
/// Callers arriving while a load is in flight await the same shared future
/// instead of fetching again. A finished load is remembered; a failed one is
/// forgotten so the next attempt fetches afresh.
pub struct ScriptLoader {
  source: Arc<dyn ScriptSource>,
  slots: Mutex<Slots>,
}

impl ScriptLoader {
  pub fn new(source: Arc<dyn ScriptSource>) -> Self {
    Self {
      source,
      slots: Mutex::new(Slots::default()),
    }
  }

  pub fn is_loaded(&self, script_id: &str) -> bool {
    matches!(self.slots.lock().by_id.get(script_id), Some(Slot::Loaded))
  }

  #[instrument(name = "ScriptLoader::ensure_loaded", skip_all, fields(script_id = %script.id, url = %script.url))]
  pub async fn ensure_loaded(&self, script: &WidgetScript) -> Result<(), ScriptLoadError> {
    let (generation, load) = {
      let mut slots = self.slots.lock();
      match slots.by_id.get(&script.id) {
        Some(Slot::Loaded) => {
          debug!("Widget script already loaded.");
          return Ok(());
        }
        Some(Slot::Loading { generation, load }) => {
          debug!("Joining in-flight widget script load.");
          (*generation, load.clone())
        }
        None => {
          let generation = slots.next_generation;
          slots.next_generation += 1;
          let source = Arc::clone(&self.source);
          let owned = script.clone();
          let load = async move { source.fetch(&owned).await.map_err(|e| format!("{:#}", e)) }
            .boxed()
            .shared();
          slots.by_id.insert(
            script.id.clone(),
            Slot::Loading {
              generation,
              load: load.clone(),
            },
          );
          (generation, load)
        }
      }
    };

    let result = load.await;

    let mut slots = self.slots.lock();
    let still_ours = matches!(
      slots.by_id.get(&script.id),
      Some(Slot::Loading { generation: g, .. }) if *g == generation
    );
    match &result {
      Ok(()) => {
        slots.by_id.insert(script.id.clone(), Slot::Loaded);
      }
      Err(reason) => {
        warn!(%reason, "Widget script load failed.");
        if still_ours {
          slots.by_id.remove(&script.id);
        }
      }
    }

    result.map_err(|reason| ScriptLoadError {
      url: script.url.clone(),
      reason,
    })
  }
}
