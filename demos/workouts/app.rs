//! Workout log exposed as a HAL collection

use hal::prelude::*;
use hal::views::FormContext;
use axum::http::header;

/// A logged workout
///
/// `name` is exposed as `title`; `secret` and `created` are never projected.
#[derive(Debug, Clone)]
pub struct Workout {
    pub id: i64,
    pub score: i64,
    pub name: Option<String>,
    pub secret: String,
    pub created: DateTime<Utc>,
}

impl Workout {
    fn new(id: i64) -> Self {
        Self {
            id,
            score: 0,
            name: None,
            secret: "secret".to_string(),
            created: Utc::now(),
        }
    }

    /// Copy cleaned form values onto the record, keyed by internal name
    fn apply(&mut self, clean: &CleanData) {
        for (field, value) in clean {
            match field.as_str() {
                "score" => {
                    if let Some(score) = value.as_i64() {
                        self.score = score;
                    }
                }
                "name" => self.name = value.as_str().map(String::from),
                _ => {}
            }
        }
    }
}

impl DomainObject for Workout {
    fn json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), json!(self.id));
        map.insert("score".to_string(), json!(self.score));
        map.insert("title".to_string(), json!(self.name));
        map
    }

    fn attribute(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::from(self.id)),
            "score" => Some(FieldValue::from(self.score)),
            "name" => Some(
                self.name
                    .as_deref()
                    .map(FieldValue::from)
                    .unwrap_or(FieldValue::Null),
            ),
            _ => None,
        }
    }
}

pub type WorkoutStore = InMemoryStore<Workout>;

/// Create and update logic of the workout form
pub struct WorkoutForm {
    store: Arc<WorkoutStore>,
}

impl WorkoutForm {
    pub fn new(store: Arc<WorkoutStore>) -> Self {
        Self { store }
    }

    fn respond(
        ctx: &FormContext<'_>,
        workout: Workout,
        status: StatusCode,
    ) -> HalResult<HalResponse> {
        let resource = ctx.as_resource("workout", workout)?;
        let location = resource.url.clone();
        resource
            .into_response()
            .with_status(status)
            .with_header(header::LOCATION, &location)
    }
}

#[async_trait]
impl FormHandler for WorkoutForm {
    async fn create(&self, ctx: &FormContext<'_>, clean: CleanData) -> HalResult<HalResponse> {
        let workout = self.store.insert_with(|id| {
            let mut workout = Workout::new(id);
            workout.apply(&clean);
            workout
        })?;
        tracing::info!(id = workout.id, "workout created");
        Self::respond(ctx, workout, StatusCode::CREATED)
    }

    async fn update(&self, ctx: &FormContext<'_>, clean: CleanData) -> HalResult<HalResponse> {
        let id = ctx
            .param("id")
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or_else(|| HalError::not_found("workout"))?;
        let workout = self.store.update_with(id, |workout| {
            workout.apply(&clean);
            Ok(())
        })?;
        tracing::info!(id, "workout updated");
        Self::respond(ctx, workout, StatusCode::OK)
    }
}

/// Field table of the workout form
pub fn workout_schema() -> HalResult<FormSchema> {
    FormSchema::builder("Workout")
        .field(FieldSpec::integer("score").required().min(1.0))
        .field(
            FieldSpec::string("title")
                .maps_to("name")
                .filter(filters::trim())
                .describe("Free-form workout name"),
        )
        .build()
}

/// Server with the workout collection registered, plus its backing store
pub fn server(config: &ViewsConfig) -> Result<(ServerBuilder, Arc<WorkoutStore>)> {
    let store = Arc::new(WorkoutStore::new());

    let workouts = HalCollection::builder("workouts", "workout", store.clone())
        .per_page(2)
        .find_link()
        .with_config(config)
        .form(workout_schema()?, WorkoutForm::new(store.clone()))
        .build()?;

    let builder = ServerBuilder::new()
        .with_config(config.clone())
        .register(workouts)?;
    Ok((builder, store))
}
