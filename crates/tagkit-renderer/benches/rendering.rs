//! Benchmarks for template rendering performance.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use tagkit_renderer::directive::PartialResolver;
use tagkit_renderer::{DirectiveProcessor, PartialError, Scope};

/// Generate a template with `rows` conditional rows, each holding `cells` cells.
fn generate_template(rows: usize, cells: usize) -> String {
    let mut html = String::with_capacity(rows * (cells * 40 + 80));
    html.push_str("<table>");
    for i in 0..rows {
        html.push_str(&format!(
            r#"<tr condition="Model.Rows[{i}].Visible" class="row-{i}">"#
        ));
        for j in 0..cells {
            html.push_str(&format!("<td>cell {i}.{j}</td>"));
        }
        html.push_str(r#"<if is="Model.Footer"><partial-c when="true" name="_cell" /></if></tr>"#);
    }
    html.push_str("</table>");
    html
}

fn generate_model(rows: usize) -> serde_json::Value {
    let rows: Vec<_> = (0..rows).map(|i| json!({"Visible": i % 2 == 0})).collect();
    json!({"Rows": rows, "Footer": true})
}

fn processor() -> DirectiveProcessor {
    let resolver: Arc<dyn PartialResolver> =
        Arc::new(|_: &str| -> Result<String, PartialError> { Ok("<td>end</td>".to_owned()) });
    DirectiveProcessor::new().with_standard_directives(resolver)
}

fn bench_render_plain(c: &mut Criterion) {
    let processor = processor();
    let template = "<div><p class=\"lead\">Hello <b>world</b></p><br /></div>".repeat(20);
    let scope = Scope::new();

    c.bench_function("render_plain_markup", |b| {
        b.iter(|| processor.render(&template, &scope));
    });
}

fn bench_render_by_size(c: &mut Criterion) {
    let processor = processor();
    let mut group = c.benchmark_group("render_by_size");

    for (rows, cells) in [(5, 2), (20, 5), (100, 10)] {
        let template = generate_template(rows, cells);
        let scope = Scope::new().with_model(generate_model(rows));

        group.throughput(Throughput::Bytes(template.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("directives", format!("{rows}r_{cells}c")),
            &template,
            |b, template| b.iter(|| processor.render(template, &scope)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_render_plain, bench_render_by_size);
criterion_main!(benches);
