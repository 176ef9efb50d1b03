use avm1rt::builtins;
use avm1rt::runtime::{new_object, ObjectRef};
use avm1rt::{Context, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn installed_context(version: u8) -> Context {
    let mut ctx = Context::new(version);
    builtins::install(&mut ctx).unwrap();
    ctx
}

fn bench_put_get(c: &mut Criterion) {
    let ctx = installed_context(7);
    c.bench_function("put+get 100 props", |b| {
        b.iter(|| {
            let obj = new_object(&ctx).unwrap();
            for i in 0..100 {
                let name = format!("prop{}", i);
                obj.put(&ctx, &name, Value::number(i as f64)).unwrap();
            }
            let mut sum = 0.0;
            for i in 0..100 {
                let name = format!("prop{}", i);
                if let Value::Number(n) = obj.get(&ctx, &name).unwrap() {
                    sum += n;
                }
            }
            black_box(sum)
        })
    });
}

fn bench_chain_lookup(c: &mut Criterion) {
    let ctx = installed_context(7);
    // 32-deep chain with the value at the top
    let top = ObjectRef::new(&ctx);
    top.put(&ctx, "target", Value::number(1.0)).unwrap();
    let mut leaf = top.clone();
    for _ in 0..32 {
        let child = ObjectRef::new(&ctx);
        child.set_prototype(Some(leaf));
        leaf = child;
    }

    c.bench_function("get through 32-link chain", |b| {
        b.iter(|| black_box(leaf.get(&ctx, "target").unwrap()))
    });
}

fn bench_case_insensitive_lookup(c: &mut Criterion) {
    let ctx = installed_context(6);
    let obj = new_object(&ctx).unwrap();
    obj.put(&ctx, "someLongPropertyName", Value::number(1.0)).unwrap();

    c.bench_function("case-folded get", |b| {
        b.iter(|| black_box(obj.get(&ctx, "SOMELONGPROPERTYNAME").unwrap()))
    });
}

fn bench_enumerate(c: &mut Criterion) {
    let ctx = installed_context(7);
    let proto = new_object(&ctx).unwrap();
    let obj = new_object(&ctx).unwrap();
    obj.set_prototype(Some(proto.clone()));
    for i in 0..50 {
        obj.put(&ctx, &format!("own{}", i), Value::number(i as f64)).unwrap();
        proto
            .put(&ctx, &format!("inherited{}", i), Value::number(i as f64))
            .unwrap();
    }

    c.bench_function("enumerate 100 keys over chain", |b| {
        b.iter(|| black_box(obj.keys(&ctx).unwrap().len()))
    });
}

criterion_group!(
    benches,
    bench_put_get,
    bench_chain_lookup,
    bench_case_insensitive_lookup,
    bench_enumerate
);
criterion_main!(benches);
