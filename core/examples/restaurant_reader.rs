// examples/restaurant_reader.rs

//! Wraps the read methods of a restaurant repository in decorated operations.
//!
//! Each method gets its own chain (logging, timer, output callback, masking,
//! retry), built once when the factory is created. A call can then switch off
//! any concern through its `RequestContext`.
//!
//! Run with `RUST_LOG=info cargo run --example restaurant_reader`.

use async_trait::async_trait;
use std::sync::Arc;
use strata::{
  Concern, Metadata, Operation, PipelineConfig, RequestContext, RetrySettings, StrataError, DURATION, RETRY_COUNT,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// --- Domain ---

#[derive(Debug, Clone, Default)]
struct Employee {
  name: String,
  role: String,
}

#[derive(Debug, Clone, Default)]
struct Restaurant {
  id: String,
  name: String,
  email: String,
  address: String,
  owners: Vec<String>,
  employees: Vec<Employee>,
  menu: Vec<String>,
  rating: u8,
}

#[derive(Debug, thiserror::Error)]
enum RepoError {
  #[error("not found")]
  NotFound,
  #[error(transparent)]
  Pipeline(#[from] StrataError),
}

/// Read side of the repository. Storage is not this example's concern.
#[async_trait]
trait RestaurantReader: Send + Sync + 'static {
  async fn find_by_name(&self, name: &str) -> Result<Vec<Restaurant>, RepoError>;
  async fn find_by_address(&self, address: &str) -> Result<Vec<Restaurant>, RepoError>;
  async fn find_by_owner(&self, owner: &str) -> Result<Vec<Restaurant>, RepoError>;
  async fn find_by_rating(&self, score: u8) -> Result<Vec<Restaurant>, RepoError>;
  async fn find_by_menu_item(&self, item: &str) -> Result<Vec<Restaurant>, RepoError>;
}

struct InMemoryReader {
  restaurants: Vec<Restaurant>,
}

impl InMemoryReader {
  fn select(&self, keep: impl Fn(&Restaurant) -> bool) -> Result<Vec<Restaurant>, RepoError> {
    let found: Vec<_> = self.restaurants.iter().filter(|r| keep(r)).cloned().collect();
    if found.is_empty() {
      Err(RepoError::NotFound)
    } else {
      Ok(found)
    }
  }
}

#[async_trait]
impl RestaurantReader for InMemoryReader {
  async fn find_by_name(&self, name: &str) -> Result<Vec<Restaurant>, RepoError> {
    self.select(|r| r.name.eq_ignore_ascii_case(name))
  }

  async fn find_by_address(&self, address: &str) -> Result<Vec<Restaurant>, RepoError> {
    self.select(|r| r.address.contains(address))
  }

  async fn find_by_owner(&self, owner: &str) -> Result<Vec<Restaurant>, RepoError> {
    self.select(|r| r.owners.iter().any(|o| o == owner))
  }

  async fn find_by_rating(&self, score: u8) -> Result<Vec<Restaurant>, RepoError> {
    self.select(|r| r.rating >= score)
  }

  async fn find_by_menu_item(&self, item: &str) -> Result<Vec<Restaurant>, RepoError> {
    self.select(|r| r.menu.iter().any(|m| m == item))
  }
}

// --- Collaborators ---

fn mask_name(name: &str) -> String {
  let chars: Vec<char> = name.chars().collect();
  if chars.len() > 2 {
    format!("{}****{}", chars[0], chars[chars.len() - 1])
  } else {
    name.to_string()
  }
}

fn mask_restaurants(mut restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
  for r in restaurants.iter_mut() {
    if !r.email.is_empty() {
      r.email = "****".to_string();
    }
    for owner in r.owners.iter_mut() {
      *owner = mask_name(owner);
    }
    for employee in r.employees.iter_mut() {
      employee.name = mask_name(&employee.name);
    }
  }
  restaurants
}

fn report_output(output: Option<&Vec<Restaurant>>, meta: &Metadata, err: Option<&RepoError>) {
  if let Some(e) = err {
    error!(error = %e, "OUTPUT: lookup failed");
    return;
  }
  let count = output.map_or(0, Vec::len);
  info!(count, retries = ?meta.get(RETRY_COUNT).map(|v| v.to_string()), "OUTPUT: received restaurant(s)");
  for (i, r) in output.into_iter().flatten().enumerate() {
    info!("  [{}] {} <{}> owners={:?}", i, r.name, r.email, r.owners);
  }
}

type Restaurants = Vec<Restaurant>;

fn chain_config<In>(settings: RetrySettings) -> PipelineConfig<In, Restaurants, RepoError>
where
  In: Clone + std::fmt::Debug + Send + 'static,
{
  PipelineConfig::new()
    .with_tracing_logger()
    .with_timing()
    .with_output(report_output)
    .with_masking(mask_restaurants)
    .with_retry(settings)
}

// --- Factory ---

/// One decorated operation per reader method, each built independently.
struct RestaurantMiddlewareFactory {
  find_by_name: Operation<String, Restaurants, RepoError>,
  find_by_address: Operation<String, Restaurants, RepoError>,
  find_by_owner: Operation<String, Restaurants, RepoError>,
  find_by_rating: Operation<u8, Restaurants, RepoError>,
  find_by_menu_item: Operation<String, Restaurants, RepoError>,
}

impl RestaurantMiddlewareFactory {
  fn new(reader: Arc<dyn RestaurantReader>, settings: RetrySettings) -> Self {
    let r = reader.clone();
    let find_by_name = chain_config(settings).build(Operation::from_fallible(move |_ctx, name: String| {
      let r = r.clone();
      async move { r.find_by_name(&name).await }
    }));

    let r = reader.clone();
    let find_by_address = chain_config(settings).build(Operation::from_fallible(move |_ctx, address: String| {
      let r = r.clone();
      async move { r.find_by_address(&address).await }
    }));

    let r = reader.clone();
    let find_by_owner = chain_config(settings).build(Operation::from_fallible(move |_ctx, owner: String| {
      let r = r.clone();
      async move { r.find_by_owner(&owner).await }
    }));

    let r = reader.clone();
    let find_by_rating = chain_config(settings).build(Operation::from_fallible(move |_ctx, score: u8| {
      let r = r.clone();
      async move { r.find_by_rating(score).await }
    }));

    let r = reader;
    let find_by_menu_item = chain_config(settings).build(Operation::from_fallible(move |_ctx, item: String| {
      let r = r.clone();
      async move { r.find_by_menu_item(&item).await }
    }));

    Self {
      find_by_name,
      find_by_address,
      find_by_owner,
      find_by_rating,
      find_by_menu_item,
    }
  }
}

fn seed() -> Vec<Restaurant> {
  vec![
    Restaurant {
      id: "1".to_string(),
      name: "Test Restaurant".to_string(),
      email: "TEST@TEST.COM".to_string(),
      address: "123 Test St, Testville".to_string(),
      owners: vec!["Test Owner".to_string()],
      employees: vec![Employee {
        name: "John Doe".to_string(),
        role: "Chef".to_string(),
      }],
      menu: vec!["Test Dish".to_string()],
      rating: 5,
    },
    Restaurant {
      id: "2".to_string(),
      name: "Corner Cafe".to_string(),
      email: "hello@corner.cafe".to_string(),
      address: "9 Main St, Testville".to_string(),
      owners: vec!["Mia Rossi".to_string()],
      employees: vec![],
      menu: vec!["Espresso".to_string(), "Test Dish".to_string()],
      rating: 3,
    },
  ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  // RESTAURANTS_RETRY_COUNT / RESTAURANTS_RETRY_DELAY_MS override the demo's two retries.
  let settings = match RetrySettings::from_env("RESTAURANTS")? {
    s if s.max_retries == 0 => RetrySettings::new(2, s.delay),
    s => s,
  };
  let reader: Arc<dyn RestaurantReader> = Arc::new(InMemoryReader { restaurants: seed() });
  let factory = RestaurantMiddlewareFactory::new(reader, settings);

  let ctx = RequestContext::new().with_operation("find_by_name");
  let env = factory.find_by_name.call(ctx.clone(), "test restaurant".to_string()).await;
  info!(
    masked = env.is_masked(),
    duration = ?env.meta(DURATION).map(|v| v.to_string()),
    "find_by_name finished"
  );
  if let Some(found) = env.data() {
    for r in found {
      info!(id = %r.id, employees = ?r.employees.iter().map(|e| format!("{} ({})", e.name, e.role)).collect::<Vec<_>>(), "restaurant");
    }
  }

  // Same operation, masking and output switched off for this call only.
  let quiet = ctx.disable(Concern::Masking).disable_output_result();
  let env = factory.find_by_name.call(quiet, "test restaurant".to_string()).await;
  info!(email = ?env.data().and_then(|v| v.first()).map(|r| r.email.clone()), "unmasked lookup");

  let env = factory
    .find_by_owner
    .call(RequestContext::new().with_operation("find_by_owner"), "Nobody".to_string())
    .await;
  info!(retries = ?env.retry_count(), failed = env.is_err(), "find_by_owner finished");

  for (label, op) in [
    ("find_by_address", &factory.find_by_address),
    ("find_by_menu_item", &factory.find_by_menu_item),
  ] {
    let query = if label == "find_by_address" { "Main St" } else { "Test Dish" };
    let env = op
      .call(RequestContext::new().with_operation(label).disable_logging(), query.to_string())
      .await;
    info!(label, hits = env.data().map_or(0, Vec::len), "lookup finished");
  }

  let env = factory
    .find_by_rating
    .call(RequestContext::new().with_operation("find_by_rating").disable_all(), 4)
    .await;
  info!(hits = env.data().map_or(0, Vec::len), metadata_entries = env.metadata.len(), "find_by_rating finished");

  Ok(())
}
