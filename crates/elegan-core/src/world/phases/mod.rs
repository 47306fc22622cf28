mod food;
mod movement;
