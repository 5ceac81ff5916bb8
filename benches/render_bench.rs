//! Quick benchmark to verify cached render performance

use std::fs;
use std::time::Instant;

use templated_views::{Data, RenderConfig, Renderer};

fn main() {
    let dir = std::env::temp_dir().join(format!("templated-views-bench-{}", std::process::id()));
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("cannot create bench dir: {}", e);
        return;
    }

    let rows: String = (0..200)
        .map(|i| format!("<tr><td>{i}</td><td>${{ name }}</td></tr>\n"))
        .collect();
    let fixtures = [
        ("plain.html", "<div>No data here</div>".to_string()),
        ("simple.html", "<div>${ name | upper }</div>".to_string()),
        ("rows.html", format!("<table>\n{rows}</table>")),
        (
            "loop.html",
            "<ol>{% for i in range(length) %}<li>${ name } ${ i }</li>{% endfor %}</ol>".to_string(),
        ),
        ("layout.html", "<h1>${ name }</h1>${ include('simple.html') }".to_string()),
    ];
    for (name, content) in &fixtures {
        if let Err(e) = fs::write(dir.join(name), content) {
            eprintln!("cannot write fixture {}: {}", name, e);
            return;
        }
    }

    let renderer = Renderer::from_config(&RenderConfig {
        root: Some(dir.clone()),
        ..RenderConfig::default()
    });
    let data = Data::new().with("name", "Performance Test").with("length", 10_000);

    println!("Template Render Performance Test");
    println!("================================\n");

    // Warm up the cache
    for (name, _) in &fixtures {
        let _ = renderer.render_file(name, &data);
    }

    for (name, _) in &fixtures {
        let iterations = if *name == "loop.html" { 20 } else { 1_000 };
        let start = Instant::now();

        for _ in 0..iterations {
            let _ = renderer.render_file(name, &data);
        }

        let elapsed = start.elapsed();
        let per_op = elapsed / iterations;

        println!("Template: {:20}", name);
        println!("  Time for {} iterations: {:?}", iterations, elapsed);
        println!("  Per operation: {:?}\n", per_op);
    }

    let _ = fs::remove_dir_all(&dir);
}
