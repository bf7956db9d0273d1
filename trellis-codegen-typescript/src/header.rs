/// Imports and helper types that every generated router module starts
/// with. `ApiRouter` is built from `CreateRouterInner`, `FakeConfig`,
/// `QueryProcedure`, and `MutationProcedure`; `DecorateProcedure` and
/// `DecoratedProcedureRecord` let client code derive `query`/`mutate`
/// call signatures from it.
pub const FILE_HEADER: &str = "\
// Generated by trellis. Manual changes will be overwritten.
import type {
  AnyQueryProcedure,
  AnyMutationProcedure,
  AnyProcedure,
  inferProcedureInput,
  inferProcedureOutput,
  DefaultErrorShape,
  DefaultDataTransformer,
  RootConfig,
  CreateRouterInner,
  BuildProcedure,
  unsetMarker,
  ProcedureRouterRecord,
  AnyRouter,
} from '@trpc/server';

type ProcedureParams<TInput> = {
  _config: RootConfig<{
    ctx: object;
    meta: object;
    errorShape: DefaultErrorShape;
    transformer: DefaultDataTransformer;
  }>;
  _output_out: typeof unsetMarker;
  _meta: unknown;
  _ctx_out: unknown;
  _input_in: TInput;
  _input_out: unknown;
  _output_in: unknown;
};

type QueryProcedure<TInput, TOutput> = BuildProcedure<'query', ProcedureParams<TInput>, TOutput>;
type MutationProcedure<TInput, TOutput> = BuildProcedure<'mutation', ProcedureParams<TInput>, TOutput>;

export type FakeConfig = RootConfig<{
  ctx: object;
  meta: object;
  errorShape: DefaultErrorShape;
  transformer: DefaultDataTransformer;
}>;

type Resolver<TProcedure extends AnyProcedure> = (
  input: inferProcedureInput<TProcedure>,
) => Promise<inferProcedureOutput<TProcedure>>;

export type DecorateProcedure<TProcedure extends AnyProcedure> =
  TProcedure extends AnyQueryProcedure
    ? { query: Resolver<TProcedure> }
    : TProcedure extends AnyMutationProcedure
      ? { mutate: Resolver<TProcedure> }
      : never;

export type DecoratedProcedureRecord<TProcedures extends ProcedureRouterRecord> = {
  [TKey in keyof TProcedures]: TProcedures[TKey] extends AnyRouter
    ? DecoratedProcedureRecord<TProcedures[TKey]['_def']['record']>
    : TProcedures[TKey] extends AnyProcedure
      ? DecorateProcedure<TProcedures[TKey]>
      : never;
};
";
