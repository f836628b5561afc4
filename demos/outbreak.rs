use zombie_spread::{
    animate::GifAnimator, config::SpreadConfig, generators, layout::ForceLayoutBuilder,
    render::BitmapVisualizer, simulation::Simulation, Rule,
};

fn main() {
    // Lobster city with 25 random shortcuts
    let mut rng = rand::thread_rng();
    let mut city = generators::random_lobster(25, 0.8, 0.8, &mut rng).unwrap();
    generators::add_random_edges(&mut city, 25, &mut rng);

    // Configure the outbreak
    let config = SpreadConfig {
        rule: Rule::Deterministic,
        output_dir: "demos/output".into(),
        ..SpreadConfig::default()
    };

    // A looser layout, bigger dots and a faster GIF encoder
    let layout = ForceLayoutBuilder::new()
        .iterations(800)
        .gravity_force(0.5)
        .repel_force(150.0)
        .damping(0.85)
        .build();
    let visualizer = BitmapVisualizer::new(800, 800)
        .node_radius(10)
        .terminal_size(100, 40);

    // Frames and zombies.gif end up in demos/output/deterministic/static
    let report = Simulation::builder(config)
        .layout_engine(layout)
        .visualizer(visualizer)
        .animator(GifAnimator::default().speed(20))
        .build()
        .unwrap()
        .run(city)
        .unwrap();
    println!("{:?}", report.history);
}
