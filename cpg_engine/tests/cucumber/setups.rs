use cucumber::given;

use crate::cucumber::{checkout_world::CheckoutSystem, CheckoutWorld};
use crate::support::prepare_env::seed_course;

#[given("a fresh install")]
async fn fresh_database(world: &mut CheckoutWorld) {
    let system = CheckoutSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "the course '{word}' costs ${int}")]
async fn course_costs(world: &mut CheckoutWorld, name: String, dollars: i64) {
    let course_id = seed_course(world.db(), &name, dollars * 100).await;
    world.system().courses.insert(name, course_id);
}
