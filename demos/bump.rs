use std::{alloc::Layout, io::Read, ptr, ptr::NonNull};

use classbump::{ArenaConfig, BumpAllocator, OversizePolicy};

/// Waits until the user presses ENTER, unless `--no-pause` was given.
/// Useful when you want to inspect the process with `pmap` or `gdb` between steps.
fn block_until_enter_pressed(pause: bool) {
  if !pause {
    return;
  }
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_alloc<P: classbump::MemoryProvider>(
  label: &str,
  allocator: &BumpAllocator<P>,
  size: usize,
  addr: NonNull<u8>,
) {
  let stats = allocator.stats();
  println!(
    "[{}] {} bytes at {:?} | chunks = {}, oversize = {}, reserved = {} bytes",
    label, size, addr, stats.chunks, stats.oversize_blocks, stats.reserved_bytes,
  );
}

fn main() {
  // RUST_LOG=classbump=debug shows chunk acquisition and release.
  env_logger::init();

  let pause = !std::env::args().any(|arg| arg == "--no-pause");

  let config = ArenaConfig::default()
    .with_class_range(8, 64 * 1024)
    .with_chunk_bytes(4096)
    .with_alignment(8)
    .with_oversize(OversizePolicy::Direct);

  let mut allocator = match BumpAllocator::new(config) {
    Ok(allocator) => allocator,
    Err(err) => {
      eprintln!("invalid configuration: {}", err);
      std::process::exit(1);
    }
  };

  println!("PID = {}, {} size classes", std::process::id(), allocator.classes().len());
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 1) A u32 lands in the smallest class (8 bytes).
  // --------------------------------------------------------------------
  let first = allocator.alloc_layout(Layout::new::<u32>()).expect("alloc u32");
  print_alloc("1", &allocator, 4, first);

  unsafe {
    first.cast::<u32>().as_ptr().write(0xDEADBEEF);
    println!("[1] value = 0x{:X}", first.cast::<u32>().as_ptr().read());
  }
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 2) 12 bytes round up to the 16-byte class, in a bucket of its own.
  // --------------------------------------------------------------------
  let second = allocator.alloc(12).expect("alloc 12");
  print_alloc("2", &allocator, 12, second);
  unsafe { ptr::write_bytes(second.as_ptr(), 0xAB, 12) };
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 3) free is a no-op: the next 8-byte allocation gets the next slot.
  // --------------------------------------------------------------------
  allocator.free(first);
  let third = allocator.alloc(8).expect("alloc 8");
  print_alloc("3", &allocator, 8, third);
  println!(
    "[3] reused the freed slot? {}",
    if third == first { "yes" } else { "no, bump allocators never reuse" }
  );
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 4) 300 allocations of 10 bytes overflow one 4 KiB chunk.
  // --------------------------------------------------------------------
  for _ in 0..300 {
    allocator.alloc(10).expect("alloc 10");
  }
  println!(
    "\n[4] 16-byte bucket now holds {} chunks",
    allocator.chunk_count(16).unwrap_or(0)
  );
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 5) Larger than the biggest class: a dedicated oversize block.
  // --------------------------------------------------------------------
  let big = allocator.alloc(256 * 1024).expect("alloc 256 KiB");
  print_alloc("5", &allocator, 256 * 1024, big);
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 6) Everything goes back at once.
  // --------------------------------------------------------------------
  match allocator.release() {
    Ok(()) => println!("\n[6] released, {:?}", allocator.stats()),
    Err(err) => eprintln!("\n[6] release incomplete: {}", err),
  }
}
