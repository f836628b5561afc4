use rand::{rngs::StdRng, SeedableRng};
use zombie_spread::{generators, spread, City, Rule, SeedSet};

fn main() {
    // Build a small world city
    let mut rng = StdRng::seed_from_u64(10);
    let mut city: City = generators::watts_strogatz(1000, 6, 0.1, &mut rng).unwrap();

    spread::initialize(&mut city, &SeedSet::Probability(0.01), &mut rng).unwrap();

    // Run 30 days of the stochastic rule without drawing anything
    for day in 0..30 {
        city = spread::next_state(&city, Rule::Stochastic, &mut rng).unwrap();
        println!("day {day}: {} zombies", city.zombie_count());
    }
}
