use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_sega_vdp::{Variant, Vdp};

/// Mode 4 screen with a patterned name table and a full sprite table
fn busy_vdp(variant: Variant) -> Vdp {
    let mut vdp = Vdp::for_variant(variant);
    vdp.write_register(0, 0x04);
    vdp.write_register(1, 0x60);
    vdp.write_register(2, 0xFF);
    vdp.write_register(5, 0xFF);

    for addr in 0..0x2000u16 {
        vdp.vram_write(addr, (addr.wrapping_mul(37) >> 3) as u8);
    }
    for cell in 0..(32 * 28u16) {
        vdp.vram_write(0x3800 + cell * 2, (cell & 0xFF) as u8);
        vdp.vram_write(0x3801 + cell * 2, ((cell >> 4) & 0x0F) as u8);
    }
    for i in 0..64u16 {
        vdp.vram_write(0x3F00 + i, (i * 3) as u8);
        vdp.vram_write(0x3F80 + i * 2, (i * 4) as u8);
        vdp.vram_write(0x3F81 + i * 2, i as u8);
    }
    for i in 0..32u8 {
        vdp.write_cram(i, i.wrapping_mul(5));
    }
    vdp
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("vdp_frame");

    for variant in [Variant::Sega315_5124, Variant::Sega315_5246, Variant::Sega315_5377] {
        group.bench_with_input(BenchmarkId::from_parameter(variant.name()), &variant, |b, &variant| {
            let mut vdp = busy_vdp(variant);
            b.iter(|| {
                vdp.run_frame();
                black_box(vdp.control_read());
            });
        });
    }

    group.finish();
}

fn bench_port_traffic(c: &mut Criterion) {
    c.bench_function("vdp_vram_fill", |b| {
        let mut vdp = Vdp::for_variant(Variant::Sega315_5246);
        b.iter(|| {
            vdp.control_write(0x00);
            vdp.control_write(0x40);
            for i in 0..0x4000u32 {
                vdp.data_write(i as u8);
            }
            black_box(vdp.port_latch().addr);
        });
    });
}

fn bench_save_state(c: &mut Criterion) {
    c.bench_function("vdp_save_state", |b| {
        let vdp = busy_vdp(Variant::Sega315_5246);
        b.iter(|| black_box(vdp.save_state()));
    });
}

criterion_group!(benches, bench_frame, bench_port_traffic, bench_save_state);
criterion_main!(benches);
