//! Command word in, exit code out.

use one_package::{CacheLayout, PackageAcquirer, PackageDescriptor, RegistryTransport};

use crate::context::InvocationContext;
use crate::error::{ExecError, Result};
use crate::loader::EntryLoader;
use crate::table::CommandTable;

/// Routes an invocation to its package and runs it.
///
/// The flow is strictly sequential: look up the command, acquire the package
/// (install or update in managed mode, nothing in bypass mode), resolve its
/// entry, load it, invoke it.
pub struct Dispatcher<'a, T: RegistryTransport + ?Sized, L: EntryLoader + ?Sized> {
    table: &'a CommandTable,
    transport: &'a T,
    loader: &'a L,
}

impl<'a, T: RegistryTransport + ?Sized, L: EntryLoader + ?Sized> Dispatcher<'a, T, L> {
    pub fn new(table: &'a CommandTable, transport: &'a T, loader: &'a L) -> Self {
        Self {
            table,
            transport,
            loader,
        }
    }

    /// Run `ctx.command`; returns the exit code the package produced.
    pub fn dispatch(&self, ctx: &InvocationContext) -> Result<i32> {
        let package = self
            .table
            .package_for(&ctx.command)
            .ok_or_else(|| ExecError::UnknownCommand {
                command: ctx.command.clone(),
                known: self.table.known_commands(),
            })?;

        let layout = match &ctx.target_path {
            Some(target) => CacheLayout::bypass(target),
            None => CacheLayout::managed(&ctx.cli_home),
        };
        tracing::debug!(command = %ctx.command, package, managed = layout.is_managed(), "dispatching");

        let mut acquirer =
            PackageAcquirer::new(PackageDescriptor::latest(package, layout), self.transport);
        acquirer.acquire()?;

        let entry = acquirer
            .resolve_entry()
            .ok_or_else(|| ExecError::NoEntryPoint {
                package: package.to_string(),
                root: acquirer
                    .package_root()
                    .unwrap_or_else(|| acquirer.descriptor().target_path().to_path_buf()),
            })?;
        tracing::debug!(entry = %entry.path.display(), version = %acquirer.descriptor().version(), "resolved entry");

        self.loader.load(&entry)?.invoke(ctx)
    }
}
